use crate::analysis::patterns::PatternId;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-size bitset holding the pattern ids a cell could still take
///
/// Uses 0-based indexing to match pattern ids throughout the system.
/// Provides O(1) membership testing and efficient set operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PatternSetRepr", into = "PatternSetRepr")]
pub struct PatternSet {
    bits: BitVec,
}

impl PatternSet {
    /// Create a set with no patterns present
    pub fn new(capacity: usize) -> Self {
        Self {
            bits: bitvec![0; capacity],
        }
    }

    /// Create a set containing every pattern id below `capacity`
    pub fn all(capacity: usize) -> Self {
        Self {
            bits: bitvec![1; capacity],
        }
    }

    /// Create a set holding exactly one pattern
    pub fn single(capacity: usize, id: PatternId) -> Self {
        let mut set = Self::new(capacity);
        set.insert(id);
        set
    }

    /// Build a set from ids, ignoring any outside the capacity
    pub fn from_ids(capacity: usize, ids: impl IntoIterator<Item = PatternId>) -> Self {
        let mut set = Self::new(capacity);
        for id in ids {
            set.insert(id);
        }
        set
    }

    /// Number of pattern ids the set can address
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Insert a pattern id
    pub fn insert(&mut self, id: PatternId) {
        if id < self.bits.len() {
            self.bits.set(id, true);
        }
    }

    /// Remove a pattern id
    pub fn remove(&mut self, id: PatternId) {
        if id < self.bits.len() {
            self.bits.set(id, false);
        }
    }

    /// Test pattern membership
    pub fn contains(&self, id: PatternId) -> bool {
        self.bits.get(id).as_deref() == Some(&true)
    }

    /// Intersect this set with another in-place
    pub fn intersect_with(&mut self, other: &Self) {
        self.bits &= &other.bits;
    }

    /// Union this set with another in-place
    pub fn union_with(&mut self, other: &Self) {
        self.bits |= &other.bits;
    }

    /// Create a new set containing the intersection
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.intersect_with(other);
        result
    }

    /// True when every member of `self` is also in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.iter().all(|id| other.contains(id))
    }

    /// Test if no patterns are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count patterns in the set
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    /// Iterate over member ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = PatternId> + '_ {
        self.bits.iter_ones()
    }

    /// Smallest member, if any
    pub fn first(&self) -> Option<PatternId> {
        self.bits.first_one()
    }

    /// Extract all pattern ids as a sorted vector
    pub fn to_vec(&self) -> Vec<PatternId> {
        self.iter().collect()
    }
}

impl fmt::Display for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternSet({} patterns: {:?})", self.len(), self.to_vec())
    }
}

/// Wire shape of a [`PatternSet`]: capacity plus sorted members
#[derive(Serialize, Deserialize)]
struct PatternSetRepr {
    capacity: usize,
    members: Vec<PatternId>,
}

impl From<PatternSetRepr> for PatternSet {
    fn from(repr: PatternSetRepr) -> Self {
        Self::from_ids(repr.capacity, repr.members)
    }
}

impl From<PatternSet> for PatternSetRepr {
    fn from(set: PatternSet) -> Self {
        Self {
            capacity: set.capacity(),
            members: set.to_vec(),
        }
    }
}
