//! Sample validation and overlapping pattern extraction

use crate::io::error::{Result, invalid_sample};
use crate::spatial::direction::Direction;
use log::debug;
use ndarray::{Array2, s};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stable identifier of a deduplicated pattern (index into the catalog)
pub type PatternId = usize;

/// Rectangular grid of tile ids the generator learns from
///
/// Stored `[y, x]`, so rows are the outer axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    tiles: Array2<usize>,
}

impl Sample {
    /// Build a sample from a list of rows
    ///
    /// # Errors
    ///
    /// Returns `InvalidSample` if there are no rows, a row is empty, or rows differ in length
    pub fn from_rows(rows: &[Vec<usize>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(invalid_sample(&"sample is empty"));
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(invalid_sample(&format!(
                "row {y} has {} tiles, expected {width}",
                row.len()
            )));
        }

        let flat: Vec<usize> = rows.iter().flatten().copied().collect();
        let tiles = Array2::from_shape_vec((height, width), flat)
            .map_err(|e| invalid_sample(&e))?;
        Ok(Self { tiles })
    }

    /// Wrap an existing `[y, x]` array
    ///
    /// # Errors
    ///
    /// Returns `InvalidSample` if either dimension is zero
    pub fn from_array(tiles: Array2<usize>) -> Result<Self> {
        if tiles.is_empty() {
            return Err(invalid_sample(&"sample is empty"));
        }
        Ok(Self { tiles })
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.tiles.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.tiles.nrows()
    }

    /// Underlying tile array indexed `[y, x]`
    pub const fn tiles(&self) -> &Array2<usize> {
        &self.tiles
    }

    /// Distinct tile ids, ascending
    pub fn tile_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.tiles.iter().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Repeat the sample periodically to cover `width x height`
    ///
    /// # Errors
    ///
    /// Returns `InvalidSample` if either target dimension is zero
    pub fn tiled(&self, width: usize, height: usize) -> Result<Self> {
        let (rows, cols) = self.tiles.dim();
        Self::from_array(Array2::from_shape_fn((height, width), |(y, x)| {
            self.tiles
                .get([y % rows, x % cols])
                .copied()
                .unwrap_or(0)
        }))
    }
}

/// An NxN block of tiles observed in the sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Position in the catalog
    pub id: PatternId,
    /// Tiles indexed `[y, x]`
    pub cells: Array2<usize>,
}

impl Pattern {
    /// Side length, or `None` when the block is not square or is empty
    pub fn size(&self) -> Option<usize> {
        let (rows, cols) = self.cells.dim();
        (rows == cols && rows > 0).then_some(rows)
    }

    /// Tile in the top-left corner, used when rendering output grids
    pub fn anchor_tile(&self) -> Option<usize> {
        self.cells.get([0, 0]).copied()
    }

    /// Tiles along the edge facing `direction`, in increasing x or y order
    ///
    /// Up is the top row, Down the bottom row, Left the first column and
    /// Right the last column.
    pub fn edge(&self, direction: Direction) -> Vec<usize> {
        let (rows, cols) = self.cells.dim();
        if rows == 0 || cols == 0 {
            return Vec::new();
        }
        match direction {
            Direction::Up => self.cells.row(0).to_vec(),
            Direction::Down => self.cells.row(rows - 1).to_vec(),
            Direction::Left => self.cells.column(0).to_vec(),
            Direction::Right => self.cells.column(cols - 1).to_vec(),
        }
    }
}

/// Deduplicated patterns of one sample with their occurrence counts
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<Pattern>,
    counts: Vec<usize>,
    lookup: HashMap<Vec<usize>, PatternId>,
    pattern_size: usize,
}

impl PatternCatalog {
    /// Slide an `n x n` window over the sample and collect distinct blocks
    ///
    /// Windows are visited row-major (y outer, x inner) and each new block
    /// takes the next id, so ids follow first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSample` if `n` is zero or exceeds either sample dimension
    pub fn extract(sample: &Sample, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(invalid_sample(&"pattern size must be at least 1"));
        }
        if sample.width() < n || sample.height() < n {
            return Err(invalid_sample(&format!(
                "sample is {}x{} but pattern size is {n}",
                sample.width(),
                sample.height()
            )));
        }

        let mut patterns = Vec::new();
        let mut counts = Vec::new();
        let mut lookup: HashMap<Vec<usize>, PatternId> = HashMap::new();

        for y in 0..=sample.height() - n {
            for x in 0..=sample.width() - n {
                let window = sample.tiles().slice(s![y..y + n, x..x + n]);
                let key: Vec<usize> = window.iter().copied().collect();

                if let Some(&id) = lookup.get(&key) {
                    if let Some(count) = counts.get_mut(id) {
                        *count += 1;
                    }
                } else {
                    let id = patterns.len();
                    lookup.insert(key, id);
                    patterns.push(Pattern {
                        id,
                        cells: window.to_owned(),
                    });
                    counts.push(1);
                }
            }
        }

        debug!(
            "Extracted {} distinct {n}x{n} patterns from {} windows",
            patterns.len(),
            counts.iter().sum::<usize>()
        );

        Ok(Self {
            patterns,
            counts,
            lookup,
            pattern_size: n,
        })
    }

    /// Patterns in id order
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Occurrences of each pattern, indexed by id
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Number of distinct patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when no pattern was extracted
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Window side length used for extraction
    pub const fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    /// Id of the pattern with the given row-major content
    pub fn id_of(&self, cells: &[usize]) -> Option<PatternId> {
        self.lookup.get(cells).copied()
    }

    /// Consume the catalog, keeping the pattern list
    pub fn into_patterns(self) -> Vec<Pattern> {
        self.patterns
    }
}
