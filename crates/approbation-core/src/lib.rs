//! approbation-core - Core library for acceptance criteria coverage
//!
//! This crate provides the building blocks for:
//! - Extracting acceptance criteria (ACs) from spec documents
//! - Extracting AC references from test artifacts (feature files, test scripts)
//! - Cross-referencing the two and tallying coverage per category and feature
//! - Checking AC anchors and spec filenames, and suggesting the next free codes
//!
//! # Features
//!
//! - `walk` - Enable [`expand_glob`] for glob-based file discovery (brings in `ignore` and `globset`)
//!
//! # Spec files and AC codes
//!
//! Spec files are named `NNNN[-NP]-XXXX-descriptive_name.md`: a 4-digit
//! sequence number, an optional `-NP` marker, a 4-letter code and a lowercase
//! slug. Every AC in a spec is written as a self-linking anchor:
//!
//! ```markdown
//! <a name="0001-EXMP-001" href="#0001-EXMP-001">0001-EXMP-001</a>
//! ```
//!
//! Tests refer to an AC by mentioning its code anywhere in their content.
//!
//! # Computing coverage
//!
//! ```
//! use approbation_core::{
//!     CategoryRegistry, FeatureRegistry, MemorySources, ReferenceReport, Registries,
//!     SpecFiles, TestReferences,
//! };
//!
//! let mut registries = Registries::new(
//!     CategoryRegistry::from_json(r#"{ "Markets": { "specs": ["0001-EXMP"] } }"#).unwrap(),
//!     FeatureRegistry::new(),
//! );
//!
//! let mut specs = SpecFiles::collect(
//!     MemorySources::new().add("0001-EXMP-example.md", "0001-EXMP-001 0001-EXMP-002"),
//!     &registries.categories,
//! )
//! .unwrap();
//! let tests = TestReferences::collect(
//!     MemorySources::new().add("qa/example.feature", "Scenario: 0001-EXMP-001"),
//! )
//! .unwrap();
//!
//! let report = ReferenceReport::compute(&mut specs, tests, &mut registries).unwrap();
//! assert_eq!(report.criteria_total, 2);
//! assert_eq!(report.referenced_percent().to_string(), "50.0");
//! ```
//!
//! Registries are owned by the caller and keep their counters between runs;
//! use [`Registries::reset_counters`] before aggregating again.
//!
//! # Reading files from disk
//!
//! ```ignore
//! use approbation_core::{CategoryRegistry, PathSources, SpecFiles, expand_glob};
//!
//! let files = expand_glob("protocol/**/*.md")?;
//! let specs = SpecFiles::collect(PathSources::new(files), &CategoryRegistry::new())?;
//! ```

mod ac_code;
mod category;
mod codes;
mod coverage;
mod feature;
mod filenames;
pub mod patterns;
mod priority;
mod references;
mod registry;
mod sequence;
mod sources;
mod spec;

pub use category::{CategoriesConfig, Category, CategoryConfig, CategoryRegistry, TOTAL};
pub use codes::{CodeIssue, CodesReport, DEFAULT_MINIMUM_CRITERIA, FileCodes, check_file};
pub use coverage::{Percent, ReferenceReport};
pub use feature::{
    Feature, FeatureConfig, FeatureDefect, FeatureIssues, FeatureRegistry, FeaturesConfig,
    RejectedFeature, UNKNOWN_MILESTONE, is_valid_feature, validate_feature,
};
pub use filenames::{FilenameIssue, FilenamesReport};
pub use priority::{DEFAULT_PRIORITY, priority_for};
pub use references::{TestReferences, is_feature_test, is_system_test};
pub use registry::{Counter, Registries, RegistryError, Tally, UNKNOWN, find_duplicate_acs};
pub use sequence::{NextCode, NextFilename, lowest_unused, next_highest};
pub use sources::{MemorySources, PathSources, Sources, read_text, without_ignored};
pub use spec::{ACCEPTABLE_MINIMUM, SpecFile, SpecFiles};

#[cfg(feature = "walk")]
pub use sources::expand_glob;
