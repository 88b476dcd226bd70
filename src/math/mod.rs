//! Mathematical utilities for the algorithm

/// Weighted Shannon entropy over cell domains
pub mod entropy;
