//! Reference aggregation: cross-referencing spec criteria with tests

use crate::references::{TestReferences, is_feature_test, is_system_test};
use crate::registry::{Counter, Registries, RegistryError, Tally};
use crate::spec::SpecFiles;
use std::fmt::{Display, Formatter};

/// A percentage rounded to one decimal place, or `n/a` when the total is 0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(Option<f64>);

impl Percent {
    pub fn of(part: usize, total: usize) -> Self {
        if total == 0 {
            Self(None)
        } else {
            Self(Some(part as f64 / total as f64 * 100.0))
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    /// The value, treating `n/a` as zero (for sorting)
    pub fn or_zero(&self) -> f64 {
        self.0.unwrap_or(0.0)
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.1}"),
            None => f.write_str("n/a"),
        }
    }
}

/// Results of one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceReport {
    pub criteria_total: usize,
    pub criteria_referenced_total: usize,
    pub criteria_unreferenced_total: usize,
    /// Every criterion of every spec, in spec order
    pub all_criteria_in_specs: Vec<String>,
    /// Codes referenced by tests but declared by no spec
    pub unknown_criteria_in_tests: TestReferences,
    /// Synthetic total row: every spec counted exactly once
    pub total: Tally,
}

impl ReferenceReport {
    /// Cross-reference every spec's criteria with the test references.
    ///
    /// `specs` is updated in place with per-spec counts, `tests` is consumed
    /// and its residual becomes [`ReferenceReport::unknown_criteria_in_tests`].
    /// Counters are added to `registries`; feature counters only when features
    /// are set. Running this twice into the same registries double-counts.
    pub fn compute(
        specs: &mut SpecFiles,
        mut tests: TestReferences,
        registries: &mut Registries,
    ) -> Result<Self, RegistryError> {
        let mut report = ReferenceReport::default();
        let with_features = registries.features.is_set();
        let categories = &mut registries.categories;
        let features = &mut registries.features;

        for spec in specs.iter_mut() {
            spec.referenced_by_feature = 0;
            spec.referenced_by_system_test = 0;
            spec.unreferenced_criteria.clear();
            spec.test_references.clear();

            let owners = spec.categories.clone();
            let count = spec.criteria.len();
            categories.increase_all(&owners, Counter::SpecCount, 1)?;
            categories.increase_all(&owners, Counter::Codes, count)?;
            report.total.increase(Counter::SpecCount, 1);
            report.total.increase(Counter::Codes, count);
            report.criteria_total += count;

            for criterion in &spec.criteria {
                report.all_criteria_in_specs.push(criterion.clone());

                let Some(referrers) = tests.take(criterion) else {
                    categories.increase_all(&owners, Counter::Covered, 0)?;
                    report.total.increase(Counter::Covered, 0);
                    spec.unreferenced_criteria.push(criterion.clone());
                    continue;
                };

                report.criteria_referenced_total += 1;
                report.total.increase(Counter::Covered, 1);
                categories.increase_all(&owners, Counter::Covered, 1)?;
                if with_features {
                    features.increase_for_ac(criterion, Counter::Covered, 1)?;
                }

                // At most one increment per kind per criterion
                if referrers.iter().any(|path| is_system_test(path)) {
                    spec.referenced_by_system_test += 1;
                    report.total.increase(Counter::SystemTestCovered, 1);
                    categories.increase_all(&owners, Counter::SystemTestCovered, 1)?;
                    if with_features {
                        features.increase_for_ac(criterion, Counter::SystemTestCovered, 1)?;
                    }
                }
                if referrers.iter().any(|path| is_feature_test(path)) {
                    spec.referenced_by_feature += 1;
                    report.total.increase(Counter::FeatureCovered, 1);
                    categories.increase_all(&owners, Counter::FeatureCovered, 1)?;
                    if with_features {
                        features.increase_for_ac(criterion, Counter::FeatureCovered, 1)?;
                    }
                }

                spec.test_references.push((criterion.clone(), referrers));
            }

            let uncovered = spec.unreferenced_criteria.len();
            if uncovered > 0 {
                report.criteria_unreferenced_total += uncovered;
                if with_features {
                    for criterion in &spec.unreferenced_criteria {
                        features.record_uncovered(criterion)?;
                    }
                }
                categories.increase_all(&owners, Counter::Uncovered, uncovered)?;
                report.total.increase(Counter::Uncovered, uncovered);
            }

            if spec.is_acceptable() {
                categories.increase_all(&owners, Counter::AcceptableSpecCount, 1)?;
                report.total.increase(Counter::AcceptableSpecCount, 1);
            }

            spec.count = count;
            spec.referenced = spec.test_references.len();
            spec.uncovered = spec.count - spec.referenced;
        }

        report.unknown_criteria_in_tests = tests;
        Ok(report)
    }

    pub fn referenced_percent(&self) -> Percent {
        Percent::of(self.criteria_referenced_total, self.criteria_total)
    }

    pub fn unreferenced_percent(&self) -> Percent {
        Percent::of(self.criteria_unreferenced_total, self.criteria_total)
    }

    /// Number of mystery codes
    pub fn mystery_count(&self) -> usize {
        self.unknown_criteria_in_tests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryRegistry;
    use crate::feature::FeatureRegistry;
    use crate::registry::UNKNOWN;
    use crate::sources::MemorySources;
    use std::path::PathBuf;

    fn run(
        specs: MemorySources,
        tests: MemorySources,
        mut registries: Registries,
    ) -> (SpecFiles, ReferenceReport, Registries) {
        let mut specs = SpecFiles::collect(specs, &registries.categories).unwrap();
        let tests = TestReferences::collect(tests).unwrap();
        let report = ReferenceReport::compute(&mut specs, tests, &mut registries).unwrap();
        (specs, report, registries)
    }

    fn empty_categories() -> Registries {
        Registries::new(
            CategoryRegistry::from_config(Default::default()),
            FeatureRegistry::new(),
        )
    }

    #[test]
    fn single_referenced_criterion() {
        let (_, report, _) = run(
            MemorySources::new().add("0001-TEST-intro.md", "0001-TEST-001"),
            MemorySources::new().add("tests/test.py", "# 0001-TEST-001"),
            empty_categories(),
        );
        assert_eq!(report.criteria_total, 1);
        assert_eq!(report.criteria_referenced_total, 1);
        assert_eq!(report.referenced_percent().to_string(), "100.0");
        assert!(report.unknown_criteria_in_tests.is_empty());
    }

    #[test]
    fn half_covered_by_feature_test() {
        let (specs, report, registries) = run(
            MemorySources::new().add("0001-TEST-intro.md", "0001-TEST-001 0001-TEST-002"),
            MemorySources::new().add("qa/intro.feature", "# 0001-TEST-002"),
            empty_categories(),
        );
        assert_eq!(report.criteria_total, 2);
        assert_eq!(report.criteria_referenced_total, 1);
        assert_eq!(report.criteria_unreferenced_total, 1);
        assert_eq!(report.referenced_percent().to_string(), "50.0");

        let unknown = &registries.categories.get(UNKNOWN).unwrap().tally;
        assert_eq!(unknown.get(Counter::FeatureCovered), 1);
        assert_eq!(unknown.get(Counter::SystemTestCovered), 0);
        assert_eq!(unknown.get(Counter::AcceptableSpecCount), 1);

        let spec = specs.get("0001-TEST-intro.md").unwrap();
        assert_eq!(spec.referenced_by_feature, 1);
        assert_eq!(spec.unreferenced_criteria, vec!["0001-TEST-001"]);
        assert_eq!(spec.count, spec.referenced + spec.uncovered);
    }

    #[test]
    fn mystery_criteria_remain() {
        let (_, report, _) = run(
            MemorySources::new().add("0001-TEST-intro.md", "0001-TEST-001"),
            MemorySources::new().add("qa/a.feature", "0001-TEST-001 0007-MYST-001"),
            empty_categories(),
        );
        assert_eq!(report.mystery_count(), 1);
        assert_eq!(
            report.unknown_criteria_in_tests.get("0007-MYST-001").unwrap(),
            [PathBuf::from("qa/a.feature")]
        );
    }

    #[test]
    fn each_kind_counted_once_per_criterion() {
        let (specs, report, _) = run(
            MemorySources::new().add("0001-TEST-intro.md", "0001-TEST-001"),
            MemorySources::new()
                .add("system-tests/test_a.py", "0001-TEST-001")
                .add("system-tests/test_b.py", "0001-TEST-001")
                .add("qa/a.feature", "0001-TEST-001")
                .add("qa/b.feature", "0001-TEST-001"),
            empty_categories(),
        );
        let spec = specs.get("0001-TEST-intro.md").unwrap();
        assert_eq!(spec.referenced_by_system_test, 1);
        assert_eq!(spec.referenced_by_feature, 1);
        assert_eq!(report.total.get(Counter::SystemTestCovered), 1);
        assert_eq!(report.total.get(Counter::FeatureCovered), 1);
    }

    #[test]
    fn feature_file_under_system_tests_counts_as_both_kinds() {
        let (specs, report, _) = run(
            MemorySources::new().add("0001-TEST-intro.md", "0001-TEST-001"),
            MemorySources::new().add("qa/system-tests/login.feature", "0001-TEST-001"),
            empty_categories(),
        );
        let spec = specs.get("0001-TEST-intro.md").unwrap();
        assert_eq!(spec.referenced_by_system_test, 1);
        assert_eq!(spec.referenced_by_feature, 1);
        assert_eq!(spec.referenced, 1);
        assert_eq!(report.total.get(Counter::SystemTestCovered), 1);
        assert_eq!(report.total.get(Counter::FeatureCovered), 1);
        assert_eq!(report.total.get(Counter::Covered), 1);
    }

    #[test]
    fn counters_accumulate_until_reset() {
        let categories =
            CategoryRegistry::from_json(r#"{ "Markets": { "specs": ["0001-TEST"] } }"#).unwrap();
        let features = FeatureRegistry::from_json(
            r#"{ "Trading": { "acs": ["0001-TEST-001", "0001-TEST-002"], "milestone": "m1" } }"#,
        )
        .unwrap();
        let mut registries = Registries::new(categories, features);
        let mut specs = SpecFiles::collect(
            MemorySources::new().add("0001-TEST-intro.md", "0001-TEST-001 0001-TEST-002"),
            &registries.categories,
        )
        .unwrap();
        let aggregate = |specs: &mut SpecFiles, registries: &mut Registries| {
            let tests =
                TestReferences::collect(MemorySources::new().add("qa/a.feature", "0001-TEST-001"))
                    .unwrap();
            ReferenceReport::compute(specs, tests, registries).unwrap()
        };
        let counts = |registries: &Registries| {
            let markets = &registries.categories.get("Markets").unwrap().tally;
            let trading = registries.features.get("Trading").unwrap();
            (
                markets.get(Counter::SpecCount),
                markets.get(Counter::Covered),
                markets.get(Counter::Uncovered),
                trading.tally.get(Counter::Covered),
                trading.tally.get(Counter::Uncovered),
            )
        };

        aggregate(&mut specs, &mut registries);
        let once = counts(&registries);
        assert_eq!(once, (1, 1, 1, 1, 1));

        aggregate(&mut specs, &mut registries);
        assert_eq!(counts(&registries), (2, 2, 2, 2, 2));

        registries.reset_counters();
        assert_eq!(counts(&registries), (0, 0, 0, 0, 0));
        assert!(registries.features.get("Trading").unwrap().uncovered_acs.is_empty());

        let report = aggregate(&mut specs, &mut registries);
        assert_eq!(counts(&registries), once);
        assert_eq!(report.criteria_referenced_total, 1);
        let trading = registries.features.get("Trading").unwrap();
        assert_eq!(
            trading.uncovered_acs.iter().collect::<Vec<_>>(),
            vec!["0001-TEST-002"]
        );
    }

    #[test]
    fn overlapping_categories_and_total() {
        let categories = CategoryRegistry::from_json(
            r#"{
                "Markets": { "specs": ["0001-TEST", "0002-OTHR"] },
                "Governance": { "specs": ["0002-OTHR"] }
            }"#,
        )
        .unwrap();
        let (_, report, registries) = run(
            MemorySources::new()
                .add("0001-TEST-intro.md", "0001-TEST-001 0001-TEST-002")
                .add("0002-OTHR-other.md", "0002-OTHR-001"),
            MemorySources::new().add("tests/t.py", "0001-TEST-001 0002-OTHR-001"),
            Registries::new(categories, FeatureRegistry::new()),
        );

        let markets = &registries.categories.get("Markets").unwrap().tally;
        let governance = &registries.categories.get("Governance").unwrap().tally;
        assert_eq!(markets.get(Counter::SpecCount), 2);
        assert_eq!(markets.get(Counter::Codes), 3);
        assert_eq!(markets.get(Counter::Covered), 2);
        assert_eq!(governance.get(Counter::SpecCount), 1);
        assert_eq!(governance.get(Counter::Codes), 1);

        assert_eq!(report.total.get(Counter::SpecCount), 2);
        assert_eq!(report.total.get(Counter::Codes), 3);
        assert_eq!(report.total.get(Counter::Covered), 2);
        assert_eq!(report.total.get(Counter::Uncovered), 1);
        assert_eq!(
            report.criteria_total,
            report.criteria_referenced_total + report.criteria_unreferenced_total
        );
    }

    #[test]
    fn feature_counters_follow_acs() {
        let features = FeatureRegistry::from_json(
            r#"{ "Trading": { "acs": ["0001-TEST-001", "0001-TEST-002"], "milestone": "m1" } }"#,
        )
        .unwrap();
        let (_, _, registries) = run(
            MemorySources::new().add("0001-TEST-intro.md", "0001-TEST-001 0001-TEST-002 0001-TEST-003"),
            MemorySources::new().add("system-tests/t.py", "0001-TEST-001 0001-TEST-003"),
            Registries::new(CategoryRegistry::from_config(Default::default()), features),
        );

        let trading = registries.features.get("Trading").unwrap();
        assert_eq!(trading.tally.get(Counter::Covered), 1);
        assert_eq!(trading.tally.get(Counter::SystemTestCovered), 1);
        assert_eq!(trading.tally.get(Counter::Uncovered), 1);
        assert!(trading.uncovered_acs.contains("0001-TEST-002"));
        let unknown = registries.features.get(UNKNOWN).unwrap();
        assert_eq!(unknown.tally.get(Counter::Covered), 1);
    }

    #[test]
    fn empty_run_reports_not_applicable() {
        let report = ReferenceReport::default();
        assert_eq!(report.referenced_percent().to_string(), "n/a");
        assert_eq!(Percent::of(1, 3).to_string(), "33.3");
    }
}
