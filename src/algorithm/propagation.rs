use crate::analysis::adjacency::AdjacencyModel;
use crate::io::error::{Result, WfcError};
use crate::spatial::grid::Narrowing;
use crate::spatial::{Direction, Grid};
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// How far narrowing spreads from a collapsed cell
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PropagationMode {
    /// Narrow the four direct neighbours only
    ///
    /// A neighbour left with a single candidate is collapsed and narrows its
    /// own neighbours in turn, so adjacent collapsed cells always agree.
    Local,
    /// Keep narrowing from every cell whose domain shrank until nothing changes
    #[default]
    FixedPoint,
}

/// Cells touched by one propagation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Cells whose domain shrank, in the order they were narrowed
    pub narrowed: Vec<(usize, usize)>,
    /// Cells that were left with one candidate and collapsed as a result
    pub forced: Vec<(usize, usize)>,
}

/// Pipeline of cells whose neighbours still need narrowing
#[derive(Debug, Default)]
pub struct PropagationQueue {
    queue: VecDeque<(usize, usize)>,
    pending: HashSet<(usize, usize)>,
}

impl PropagationQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell, skipping it if already pending
    pub fn push(&mut self, position: (usize, usize)) {
        if self.pending.insert(position) {
            self.queue.push_back(position);
        }
    }

    /// Remove and return the next cell
    pub fn take_next(&mut self) -> Option<(usize, usize)> {
        let next = self.queue.pop_front()?;
        self.pending.remove(&next);
        Some(next)
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Get the number of pending cells
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Narrow neighbour domains after the cell at `origin` was collapsed
///
/// Out-of-bounds and already collapsed neighbours are skipped. Each live
/// neighbour is intersected with the patterns the source cell supports in
/// that direction.
///
/// # Errors
///
/// Returns `Contradiction` with the coordinates of the first cell whose
/// domain became empty. The grid is left as it was at that point.
pub fn propagate(
    grid: &mut Grid,
    adjacency: &AdjacencyModel,
    origin: (usize, usize),
    mode: PropagationMode,
) -> Result<PropagationReport> {
    let mut report = PropagationReport::default();
    let mut queue = PropagationQueue::new();
    queue.push(origin);

    while let Some((x, y)) = queue.take_next() {
        let Some(source) = grid.get(x, y).map(|cell| cell.domain.clone()) else {
            continue;
        };

        for direction in Direction::ALL {
            let Some((nx, ny)) = grid.neighbor(x, y, direction) else {
                continue;
            };
            let allowed = adjacency.supported(direction, &source);
            let Some(neighbor) = grid.get_mut(nx, ny) else {
                continue;
            };
            if neighbor.collapsed {
                continue;
            }

            match neighbor.narrow(&allowed) {
                Narrowing::Unchanged => {}
                Narrowing::Reduced => {
                    trace!(
                        "Narrowed ({nx}, {ny}) to {} patterns from {direction} of ({x}, {y})",
                        neighbor.domain.len()
                    );
                    report.narrowed.push((nx, ny));
                    if mode == PropagationMode::FixedPoint {
                        queue.push((nx, ny));
                    }
                }
                Narrowing::Forced(id) => {
                    trace!("Forced ({nx}, {ny}) to pattern {id}");
                    report.narrowed.push((nx, ny));
                    report.forced.push((nx, ny));
                    queue.push((nx, ny));
                }
                Narrowing::Emptied => {
                    warn!("Contradiction at ({nx}, {ny}) while propagating from ({x}, {y})");
                    return Err(WfcError::Contradiction { x: nx, y: ny });
                }
            }
        }
    }

    Ok(report)
}
