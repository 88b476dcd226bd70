//! Relative-frequency weights for pattern selection

use crate::analysis::patterns::{PatternCatalog, PatternId};
use serde::{Deserialize, Serialize};

/// Weight per pattern id, proportional to how often it occurs in the sample
///
/// Weights sum to 1 when derived from a non-zero tally. A zero tally falls
/// back to a uniform weight of 1.0 so no valid domain ends up with zero
/// total weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    weights: Vec<f64>,
    total: usize,
}

impl WeightTable {
    /// Derive weights from per-id occurrence counts
    pub fn from_counts(counts: &[usize]) -> Self {
        let total: usize = counts.iter().sum();
        let weights = if total == 0 {
            vec![1.0; counts.len()]
        } else {
            counts
                .iter()
                .map(|&c| (c as f64) / (total as f64))
                .collect()
        };
        Self { weights, total }
    }

    /// Weights for every pattern in a catalog
    pub fn from_catalog(catalog: &PatternCatalog) -> Self {
        Self::from_counts(catalog.counts())
    }

    /// Weight of a pattern, 0.0 for ids outside the table
    pub fn weight(&self, id: PatternId) -> f64 {
        self.weights.get(id).copied().unwrap_or(0.0)
    }

    /// Number of patterns covered
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True when the table covers no patterns
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Total occurrences the weights were derived from
    pub const fn total(&self) -> usize {
        self.total
    }

    /// True when the uniform fallback was used
    pub const fn is_uniform_fallback(&self) -> bool {
        self.total == 0
    }

    /// Weights indexed by pattern id
    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }
}
