/// Fixed-capacity pattern sets for cell domains
pub mod bitset;
/// Generation state and the single collapse step
pub mod executor;
/// Constraint narrowing after a collapse
pub mod propagation;
/// Run loop, cancellation and retries
pub mod runner;
/// Minimum-entropy cell selection and weighted pattern choice
pub mod selection;
