//! Spatial data structures for the output grid
//!
//! This module contains spatial-related functionality including:
//! - The four grid directions and their opposites
//! - Cell domains and the output grid

/// Grid directions and offsets
pub mod direction;
/// Cells and the output grid
pub mod grid;

pub use direction::Direction;
pub use grid::{Cell, Grid};
