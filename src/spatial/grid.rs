//! Output grid of cells, each holding its remaining pattern domain
//!
//! Cells are stored in an `ndarray` indexed `[y, x]`. A cell counts as
//! collapsed exactly when one candidate remains, and that candidate is its
//! tile; every mutation goes through [`Cell`] so the two never drift apart.

use crate::algorithm::bitset::PatternSet;
use crate::analysis::patterns::PatternId;
use crate::spatial::direction::Direction;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One output position and the patterns it could still take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Remaining candidate pattern ids
    pub domain: PatternSet,
    /// True once a single candidate remains
    pub collapsed: bool,
    /// The fixed pattern when collapsed
    pub tile: Option<PatternId>,
}

/// Effect of intersecting a cell's domain with a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narrowing {
    /// Nothing was removed
    Unchanged,
    /// Some candidates were removed and at least two remain
    Reduced,
    /// Exactly one candidate remains and the cell is now collapsed
    Forced(PatternId),
    /// No candidate remains
    Emptied,
}

impl Cell {
    /// A cell that may take any of `pattern_count` patterns
    ///
    /// With a single pattern there is nothing left to decide, so the cell
    /// starts collapsed.
    pub fn open(pattern_count: usize) -> Self {
        let mut cell = Self {
            domain: PatternSet::all(pattern_count),
            collapsed: false,
            tile: None,
        };
        cell.sync_collapsed();
        cell
    }

    /// Fix the cell to one pattern
    pub fn collapse_to(&mut self, id: PatternId) {
        self.domain = PatternSet::single(self.domain.capacity(), id);
        self.collapsed = true;
        self.tile = Some(id);
    }

    /// Intersect the domain with `allowed`
    pub fn narrow(&mut self, allowed: &PatternSet) -> Narrowing {
        let before = self.domain.len();
        self.domain.intersect_with(allowed);
        let after = self.domain.len();

        if after == before {
            return Narrowing::Unchanged;
        }
        match self.domain.first() {
            None => {
                self.collapsed = false;
                self.tile = None;
                Narrowing::Emptied
            }
            Some(id) if after == 1 => {
                self.collapse_to(id);
                Narrowing::Forced(id)
            }
            Some(_) => Narrowing::Reduced,
        }
    }

    /// True when the flag, tile and domain size agree
    pub fn is_consistent(&self) -> bool {
        if self.collapsed {
            self.domain.len() == 1 && self.tile.is_some() && self.tile == self.domain.first()
        } else {
            self.domain.len() != 1 && self.tile.is_none()
        }
    }

    fn sync_collapsed(&mut self) {
        if self.domain.len() == 1 {
            self.collapsed = true;
            self.tile = self.domain.first();
        }
    }
}

/// A `width x height` array of cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    /// Grid where every cell may take any of `pattern_count` patterns
    pub fn new(width: usize, height: usize, pattern_count: usize) -> Self {
        Self {
            cells: Array2::from_elem((height, width), Cell::open(pattern_count)),
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Cell at `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells.get([y, x])
    }

    /// Mutable cell at `(x, y)`
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        self.cells.get_mut([y, x])
    }

    /// Coordinates one step in `direction`, or `None` past the border
    pub fn neighbor(&self, x: usize, y: usize, direction: Direction) -> Option<(usize, usize)> {
        let (dx, dy) = direction.offset();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < self.width() && ny < self.height()).then_some((nx, ny))
    }

    /// Cells with their coordinates, y outer and x inner
    pub fn iter_row_major(&self) -> impl Iterator<Item = ((usize, usize), &Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((y, x), cell)| ((x, y), cell))
    }

    /// Number of cells still undecided
    pub fn uncollapsed_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.collapsed).count()
    }

    /// Number of cells fixed to a pattern
    pub fn collapsed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.collapsed).count()
    }

    /// Underlying array indexed `[y, x]`
    pub const fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }
}
