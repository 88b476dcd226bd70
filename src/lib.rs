//! Overlapping wave function collapse for integer tile grids
//!
//! A sample grid is cut into square patterns, each pattern gets a weight from
//! its frequency and an edge-matching adjacency rule per direction. An output
//! grid starts with every pattern possible in every cell, then repeatedly
//! collapses the lowest-entropy cell and propagates the constraint until the
//! grid is fully decided or a cell runs out of candidates.

#![deny(unsafe_code)]

/// Generation state, tick, propagation and the run loop
pub mod algorithm;
/// Pattern extraction, weights and adjacency rules learned from a sample
pub mod analysis;
/// Sample loading, exports, snapshots, CLI and error handling
pub mod io;
/// Entropy of a cell domain
pub mod math;
/// Directions and the output grid
pub mod spatial;

pub use algorithm::executor::{TickEvent, WfcState};
pub use algorithm::propagation::PropagationMode;
pub use algorithm::runner::{RunLoop, RunOutcome, RunStatus, run, run_with_retries};
pub use algorithm::selection::RandomSelector;
pub use analysis::patterns::Sample;
pub use io::error::{Result, WfcError};
