use crate::algorithm::bitset::PatternSet;
use crate::analysis::patterns::PatternId;
use crate::analysis::weights::WeightTable;
use crate::math::entropy::shannon_entropy;
use crate::spatial::Grid;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Uncollapsed cell chosen for the next collapse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellChoice {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
    /// Entropy of the cell's domain at selection time
    pub entropy: f64,
}

/// Find the uncollapsed cell with the lowest entropy
///
/// Cells are scanned row-major (y outer, x inner) and only a strictly lower
/// entropy replaces the current best, so ties go to the first cell in that
/// order. Returns `None` when every cell is collapsed.
pub fn select_min_entropy_cell(grid: &Grid, weights: &WeightTable) -> Option<CellChoice> {
    let mut best: Option<CellChoice> = None;

    for ((x, y), cell) in grid.iter_row_major() {
        if cell.collapsed {
            continue;
        }
        let entropy = shannon_entropy(&cell.domain, weights);
        if best.is_none_or(|b| entropy < b.entropy) {
            best = Some(CellChoice { x, y, entropy });
        }
    }

    best
}

/// Seeded random selector for reproducible stochastic choices
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: StdRng,
    seed: u64,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this selector was created from
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Generic weighted random selection
    ///
    /// Returns index into weights array using cumulative distribution.
    /// Falls back to a uniform draw when the weights sum to zero.
    pub fn weighted_choice(&mut self, weights: &[f64]) -> usize {
        if weights.is_empty() {
            return 0;
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return self.rng.random_range(0..weights.len());
        }

        let mut rand_val = self.rng.random::<f64>() * total;
        for (i, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            rand_val -= weight;
            if rand_val <= 0.0 {
                return i;
            }
        }

        // Rounding can leave a sliver past the end; give it to the last weighted entry
        weights.iter().rposition(|&w| w > 0.0).unwrap_or(weights.len() - 1)
    }

    /// Draw one member of `domain` with probability proportional to its weight
    pub fn choose_pattern(
        &mut self,
        domain: &PatternSet,
        weights: &WeightTable,
    ) -> Option<PatternId> {
        let candidates = domain.to_vec();
        if candidates.is_empty() {
            return None;
        }
        let candidate_weights: Vec<f64> = candidates.iter().map(|&id| weights.weight(id)).collect();
        let index = self.weighted_choice(&candidate_weights);
        candidates.get(index).copied()
    }
}
