// Differential set engine
// Splits two scoped locator sets into shared and identity-unique parts

use crate::models::{LocatorSet, ScopedLocatorSet};

/// Partition of two locator sets. `shared`, `unique_to_a` and `unique_to_b`
/// are pairwise disjoint and together cover `a ∪ b`.
///
/// Membership is exact locator equality: `/a` and `/a/`, or the same query
/// parameters in a different order, are different resources. That
/// under-reports shared resources rather than guessing at equivalence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffResult {
    pub shared: LocatorSet,
    pub unique_to_a: LocatorSet,
    pub unique_to_b: LocatorSet,
}

impl DiffResult {
    /// Everything either side can reach.
    pub fn union(&self) -> LocatorSet {
        self.shared
            .union(&self.unique_to_a)
            .union(&self.unique_to_b)
    }
}

/// Diff two scoped sets.
pub fn diff(a: &ScopedLocatorSet, b: &ScopedLocatorSet) -> DiffResult {
    diff_sets(a.locators(), b.locators())
}

/// Diff two plain locator sets.
pub fn diff_sets(a: &LocatorSet, b: &LocatorSet) -> DiffResult {
    DiffResult {
        shared: a.intersection(b),
        unique_to_a: a.difference(b),
        unique_to_b: b.difference(a),
    }
}
