//! Analysis modules that turn a sample into generation rules

/// Adjacency rules built from pattern edges
pub mod adjacency;
/// Sample validation and pattern extraction
pub mod patterns;
/// Frequency weights for pattern selection
pub mod weights;
