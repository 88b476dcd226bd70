use crate::algorithm::bitset::PatternSet;
use crate::analysis::weights::WeightTable;

/// Weighted Shannon entropy of a cell domain, in nats
///
/// Empty domains and domains whose weights sum to zero return infinity so
/// they are never picked as the least uncertain cell. A single candidate has
/// entropy 0.
pub fn shannon_entropy(domain: &PatternSet, weights: &WeightTable) -> f64 {
    if domain.is_empty() {
        return f64::INFINITY;
    }

    let total: f64 = domain.iter().map(|id| weights.weight(id)).sum();
    if total <= 0.0 {
        return f64::INFINITY;
    }

    let entropy = domain
        .iter()
        .map(|id| weights.weight(id) / total)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.ln())
        .sum::<f64>();

    // -0.0 and rounding noise below zero both read as "fully determined"
    entropy.max(0.0)
}
