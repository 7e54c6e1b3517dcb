//! Shared counter bookkeeping for category and feature registries

use crate::category::CategoryRegistry;
use crate::feature::FeatureRegistry;
use facet::Facet;
use std::collections::HashMap;
use std::hash::Hash;

/// Name of the implicit category/feature that collects everything unmatched.
pub const UNKNOWN: &str = "Unknown";

/// Precondition violations when querying or updating a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The category registry was queried before categories were set.
    #[error("Categories have not been set")]
    CategoriesNotSet,
    /// The feature registry was queried before features were set.
    #[error("Features have not been set")]
    FeaturesNotSet,
    /// A counter update named a category that is not configured.
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
    /// A counter update named a feature that is not configured.
    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),
}

/// The counters kept for every category and feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Counter {
    SpecCount,
    AcceptableSpecCount,
    Codes,
    Covered,
    Uncovered,
    FeatureCovered,
    SystemTestCovered,
}

impl Counter {
    pub const ALL: [Counter; 7] = [
        Counter::SpecCount,
        Counter::AcceptableSpecCount,
        Counter::Codes,
        Counter::Covered,
        Counter::Uncovered,
        Counter::FeatureCovered,
        Counter::SystemTestCovered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::SpecCount => "specCount",
            Counter::AcceptableSpecCount => "acceptableSpecCount",
            Counter::Codes => "codes",
            Counter::Covered => "covered",
            Counter::Uncovered => "uncovered",
            Counter::FeatureCovered => "featureCovered",
            Counter::SystemTestCovered => "systemTestCovered",
        }
    }
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running counters for one category or feature.
///
/// A counter that was never increased is `None`; increasing by zero still
/// marks it as touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct Tally {
    #[facet(default)]
    pub spec_count: Option<usize>,
    #[facet(default)]
    pub acceptable_spec_count: Option<usize>,
    #[facet(default)]
    pub codes: Option<usize>,
    #[facet(default)]
    pub covered: Option<usize>,
    #[facet(default)]
    pub uncovered: Option<usize>,
    #[facet(default)]
    pub feature_covered: Option<usize>,
    #[facet(default)]
    pub system_test_covered: Option<usize>,
}

impl Tally {
    fn slot(&self, counter: Counter) -> &Option<usize> {
        match counter {
            Counter::SpecCount => &self.spec_count,
            Counter::AcceptableSpecCount => &self.acceptable_spec_count,
            Counter::Codes => &self.codes,
            Counter::Covered => &self.covered,
            Counter::Uncovered => &self.uncovered,
            Counter::FeatureCovered => &self.feature_covered,
            Counter::SystemTestCovered => &self.system_test_covered,
        }
    }

    fn slot_mut(&mut self, counter: Counter) -> &mut Option<usize> {
        match counter {
            Counter::SpecCount => &mut self.spec_count,
            Counter::AcceptableSpecCount => &mut self.acceptable_spec_count,
            Counter::Codes => &mut self.codes,
            Counter::Covered => &mut self.covered,
            Counter::Uncovered => &mut self.uncovered,
            Counter::FeatureCovered => &mut self.feature_covered,
            Counter::SystemTestCovered => &mut self.system_test_covered,
        }
    }

    /// Get-or-initialize-then-add.
    pub fn increase(&mut self, counter: Counter, amount: usize) {
        let slot = self.slot_mut(counter);
        *slot = Some(slot.unwrap_or(0) + amount);
    }

    /// Current value, zero when never touched.
    pub fn get(&self, counter: Counter) -> usize {
        self.slot(counter).unwrap_or(0)
    }

    pub fn is_touched(&self, counter: Counter) -> bool {
        self.slot(counter).is_some()
    }

    /// Add every touched counter of `other` into this tally.
    pub fn absorb(&mut self, other: &Tally) {
        for counter in Counter::ALL {
            if let Some(amount) = *other.slot(counter) {
                self.increase(counter, amount);
            }
        }
    }
}

/// Both registries a run aggregates into.
///
/// Registries are owned by the caller and are not reset between runs:
/// aggregating twice into the same registries double-counts, so call
/// [`Registries::reset_counters`] or build fresh registries per run.
#[derive(Debug, Default)]
pub struct Registries {
    pub categories: CategoryRegistry,
    pub features: FeatureRegistry,
}

impl Registries {
    pub fn new(categories: CategoryRegistry, features: FeatureRegistry) -> Self {
        Self {
            categories,
            features,
        }
    }

    /// Zero every counter while keeping the configured membership.
    pub fn reset_counters(&mut self) {
        self.categories.reset_counters();
        self.features.reset_counters();
    }
}

/// Values that appear more than once in `items`, each reported once, in the
/// order their second occurrence is found.
pub fn find_duplicate_acs<T>(items: &[T]) -> Vec<T>
where
    T: Clone + Eq + Hash,
{
    let mut seen: HashMap<&T, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for item in items {
        let count = seen.entry(item).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(item.clone());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increase_initializes_then_adds() {
        let mut tally = Tally::default();
        assert!(!tally.is_touched(Counter::Covered));
        tally.increase(Counter::Covered, 0);
        assert!(tally.is_touched(Counter::Covered));
        assert_eq!(tally.get(Counter::Covered), 0);
        tally.increase(Counter::Covered, 3);
        tally.increase(Counter::Covered, 2);
        assert_eq!(tally.get(Counter::Covered), 5);
        assert_eq!(tally.get(Counter::Uncovered), 0);
    }

    #[test]
    fn absorb_skips_untouched() {
        let mut a = Tally::default();
        a.increase(Counter::Codes, 2);
        let mut b = Tally::default();
        b.increase(Counter::Codes, 3);
        b.increase(Counter::Covered, 1);
        a.absorb(&b);
        assert_eq!(a.get(Counter::Codes), 5);
        assert_eq!(a.get(Counter::Covered), 1);
        assert!(!a.is_touched(Counter::Uncovered));
    }

    #[test]
    fn duplicates_reported_once() {
        let acs = ["0001-A", "0002-B", "0001-A", "0003-C", "0001-A", "0002-B"];
        assert_eq!(find_duplicate_acs(&acs), vec!["0001-A", "0002-B"]);
    }

    #[test]
    fn no_duplicates_in_unique_list() {
        let acs: Vec<String> = vec!["a".into(), "b".into()];
        assert!(find_duplicate_acs(&acs).is_empty());
    }
}
