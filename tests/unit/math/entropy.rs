//! Tests for weighted Shannon entropy

#[cfg(test)]
mod tests {
    use wavetile::algorithm::bitset::PatternSet;
    use wavetile::analysis::weights::WeightTable;
    use wavetile::math::entropy::shannon_entropy;

    // Uniform domains have entropy ln(n)
    #[test]
    fn test_uniform_entropy() {
        let weights = WeightTable::from_counts(&[1, 1, 1, 1]);
        let entropy = shannon_entropy(&PatternSet::all(4), &weights);
        assert!((entropy - 4f64.ln()).abs() < 1e-12);
    }

    // A single candidate is fully determined
    #[test]
    fn test_single_candidate_zero() {
        let weights = WeightTable::from_counts(&[2, 5]);
        assert_eq!(shannon_entropy(&PatternSet::single(2, 1), &weights), 0.0);
    }

    // Skewed weights lower the entropy
    #[test]
    fn test_skewed_weights_lower() {
        let even = WeightTable::from_counts(&[1, 1]);
        let skewed = WeightTable::from_counts(&[9, 1]);
        let domain = PatternSet::all(2);
        assert!(shannon_entropy(&domain, &skewed) < shannon_entropy(&domain, &even));
    }

    // Empty and weightless domains are infinitely uncertain
    #[test]
    fn test_degenerate_domains() {
        let weights = WeightTable::from_counts(&[1, 1, 0]);
        assert!(shannon_entropy(&PatternSet::new(3), &weights).is_infinite());
        assert!(shannon_entropy(&PatternSet::single(3, 2), &weights).is_infinite());
    }
}
