//! Edge-matching adjacency rules between patterns
//!
//! Pattern `q` may sit next to pattern `p` in direction `d` when the edge of
//! `p` facing `d` equals the edge of `q` facing back toward `p`. Rules are
//! computed once for every ordered pair and direction.

use crate::algorithm::bitset::PatternSet;
use crate::analysis::patterns::{Pattern, PatternId};
use crate::spatial::direction::Direction;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Compatible neighbours for every pattern in one direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionRules {
    /// Compatible set per pattern id
    pub compatible: Vec<PatternSet>,
    /// Set when the patterns could not be compared and every pair is allowed
    pub permissive: bool,
}

/// Per-direction compatibility between all pattern pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyModel {
    rules: [DirectionRules; 4],
    pattern_count: usize,
}

impl AdjacencyModel {
    /// Compare every ordered pattern pair along all four directions
    ///
    /// A direction whose edges cannot be read consistently (non-square or
    /// mismatched pattern shapes) falls back to allowing every pair. The
    /// fallback is recorded in [`DirectionRules::permissive`].
    pub fn build(patterns: &[Pattern]) -> Self {
        let pattern_count = patterns.len();
        let rules = Direction::ALL.map(|direction| {
            build_direction(patterns, direction).unwrap_or_else(|| {
                warn!("Degenerate pattern shapes, allowing all {direction} neighbours");
                DirectionRules {
                    compatible: vec![PatternSet::all(pattern_count); pattern_count],
                    permissive: true,
                }
            })
        });

        let model = Self {
            rules,
            pattern_count,
        };
        debug!(
            "Built adjacency for {pattern_count} patterns ({} allowed pairs)",
            model.allowed_pair_count()
        );
        model
    }

    /// Number of patterns the rules cover
    pub const fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    /// Rules for one direction
    pub const fn rules(&self, direction: Direction) -> &DirectionRules {
        match direction {
            Direction::Up => &self.rules[0],
            Direction::Right => &self.rules[1],
            Direction::Down => &self.rules[2],
            Direction::Left => &self.rules[3],
        }
    }

    /// Whether the direction uses the allow-everything fallback
    pub const fn is_permissive(&self, direction: Direction) -> bool {
        self.rules(direction).permissive
    }

    /// Patterns that may sit in `direction` from a cell holding `id`
    ///
    /// Unknown ids map to `None`.
    pub fn compatible(&self, direction: Direction, id: PatternId) -> Option<&PatternSet> {
        self.rules(direction).compatible.get(id)
    }

    /// Whether `q` may be placed in `direction` from `p`
    pub fn allows(&self, direction: Direction, p: PatternId, q: PatternId) -> bool {
        self.compatible(direction, p)
            .is_some_and(|set| set.contains(q))
    }

    /// Union of compatible sets over every member of `domain`
    pub fn supported(&self, direction: Direction, domain: &PatternSet) -> PatternSet {
        let mut support = PatternSet::new(self.pattern_count);
        for id in domain.iter() {
            if let Some(set) = self.compatible(direction, id) {
                support.union_with(set);
            }
        }
        support
    }

    /// Pairs allowed one way but not mirrored in the opposite direction
    ///
    /// Edge matching is symmetric, so this should be empty for strict rules.
    pub fn symmetry_violations(&self) -> Vec<(Direction, PatternId, PatternId)> {
        let mut violations = Vec::new();
        for direction in Direction::ALL {
            for p in 0..self.pattern_count {
                for q in 0..self.pattern_count {
                    if self.allows(direction, p, q) && !self.allows(direction.opposite(), q, p) {
                        violations.push((direction, p, q));
                    }
                }
            }
        }
        violations
    }

    /// Total allowed (direction, p, q) triples
    pub fn allowed_pair_count(&self) -> usize {
        self.rules
            .iter()
            .flat_map(|r| r.compatible.iter())
            .map(PatternSet::len)
            .sum()
    }
}

fn build_direction(patterns: &[Pattern], direction: Direction) -> Option<DirectionRules> {
    let size = patterns.first().and_then(Pattern::size);
    if patterns.iter().any(|p| p.size().is_none() || p.size() != size) {
        return None;
    }

    let outgoing: Vec<Vec<usize>> = patterns.iter().map(|p| p.edge(direction)).collect();
    let incoming: Vec<Vec<usize>> = patterns
        .iter()
        .map(|p| p.edge(direction.opposite()))
        .collect();
    if outgoing.iter().chain(&incoming).any(Vec::is_empty) {
        return None;
    }

    let compatible = outgoing
        .iter()
        .map(|edge| {
            PatternSet::from_ids(
                patterns.len(),
                incoming
                    .iter()
                    .enumerate()
                    .filter(|(_, other)| *other == edge)
                    .map(|(q, _)| q),
            )
        })
        .collect();

    Some(DirectionRules {
        compatible,
        permissive: false,
    })
}
