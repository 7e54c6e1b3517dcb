//! Spec collection: which acceptance criteria each spec file declares

use crate::category::CategoryRegistry;
use crate::patterns::{file_name_of, find_criteria, is_readme, parse_spec_filename};
use crate::priority::priority_for;
use crate::sources::Sources;
use eyre::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One specification document and what aggregation learned about it
#[derive(Debug, Clone)]
pub struct SpecFile {
    /// Base name of the source file
    pub file_name: String,
    pub path: PathBuf,
    /// Spec prefix, e.g. `0001-MKTF` or `0011-NP-CLIE`
    pub code: String,
    /// AC codes declared in the file, deduplicated in first-seen order
    pub criteria: Vec<String>,
    /// Owning categories; empty when categories were never configured
    pub categories: Vec<String>,
    pub priority: u8,

    // Set by the reference aggregator
    pub count: usize,
    pub referenced: usize,
    pub uncovered: usize,
    pub referenced_by_feature: usize,
    pub referenced_by_system_test: usize,
    pub unreferenced_criteria: Vec<String>,
    /// Criteria with at least one test reference, and the referring files
    pub test_references: Vec<(String, Vec<PathBuf>)>,
}

impl SpecFile {
    /// Build a spec from its file name and content. `None` when the file
    /// name is not a valid spec filename.
    pub fn parse(path: &Path, content: &str) -> Option<Self> {
        let file_name = file_name_of(path);
        let code = parse_spec_filename(&file_name)?.prefix();

        let mut seen = HashSet::new();
        let criteria: Vec<String> = find_criteria(&code, content)
            .into_iter()
            .filter(|c| seen.insert(*c))
            .map(str::to_string)
            .collect();

        Some(Self {
            priority: priority_for(&code),
            file_name,
            path: path.to_path_buf(),
            code,
            criteria,
            categories: Vec::new(),
            count: 0,
            referenced: 0,
            uncovered: 0,
            referenced_by_feature: 0,
            referenced_by_system_test: 0,
            unreferenced_criteria: Vec::new(),
            test_references: Vec::new(),
        })
    }

    /// Whether the spec declares more than one criterion
    pub fn is_acceptable(&self) -> bool {
        self.criteria.len() > ACCEPTABLE_MINIMUM
    }
}

/// A spec needs strictly more criteria than this to count as acceptable.
pub const ACCEPTABLE_MINIMUM: usize = 1;

/// Every collected spec, keyed by file name in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SpecFiles {
    specs: Vec<SpecFile>,
    skipped: Vec<String>,
}

impl SpecFiles {
    /// Scan `sources` for spec files.
    ///
    /// README files are ignored. Files with an invalid name are skipped with a
    /// warning. When two files share a base name the first one wins.
    pub fn collect(sources: impl Sources, categories: &CategoryRegistry) -> Result<Self> {
        let mut collected = Self::default();
        let mut names = HashSet::new();

        sources.visit(&mut |path, content| {
            if is_readme(path) {
                return Ok(());
            }
            let Some(mut spec) = SpecFile::parse(path, content) else {
                let name = file_name_of(path);
                tracing::warn!("Skipping {} (not a valid spec filename)", name);
                collected.skipped.push(name);
                return Ok(());
            };
            if !names.insert(spec.file_name.clone()) {
                tracing::debug!("Ignoring {}: file name already collected", path.display());
                return Ok(());
            }
            spec.categories = categories
                .categories_for_spec(&spec.code)
                .unwrap_or_default();
            collected.specs.push(spec);
            Ok(())
        })?;

        tracing::debug!("Collected {} spec files", collected.specs.len());
        Ok(collected)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpecFile> {
        self.specs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SpecFile> {
        self.specs.iter_mut()
    }

    pub fn get(&self, file_name: &str) -> Option<&SpecFile> {
        self.specs.iter().find(|s| s.file_name == file_name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// File names skipped for not matching the spec filename pattern
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Every criterion of every spec, in collection order
    pub fn all_criteria(&self) -> impl Iterator<Item = &str> {
        self.specs
            .iter()
            .flat_map(|s| s.criteria.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RegistryError, UNKNOWN};
    use crate::sources::MemorySources;

    #[test]
    fn criteria_are_deduplicated_in_order() {
        let spec = SpecFile::parse(
            Path::new("protocol/0001-TEST-intro.md"),
            r##"<a name="0001-TEST-002" href="#0001-TEST-002">0001-TEST-002</a>
                <a name="0001-TEST-001" href="#0001-TEST-001">0001-TEST-001</a>
                See also 0002-OTHR-001."##,
        )
        .unwrap();
        assert_eq!(spec.file_name, "0001-TEST-intro.md");
        assert_eq!(spec.code, "0001-TEST");
        assert_eq!(spec.criteria, vec!["0001-TEST-002", "0001-TEST-001"]);
        assert!(spec.is_acceptable());
    }

    #[test]
    fn extraction_is_idempotent() {
        let content = "0001-TEST-001 0001-TEST-003 0001-TEST-001";
        let a = SpecFile::parse(Path::new("0001-TEST-intro.md"), content).unwrap();
        let b = SpecFile::parse(Path::new("0001-TEST-intro.md"), content).unwrap();
        assert_eq!(a.criteria, b.criteria);
    }

    #[test]
    fn readme_and_invalid_names_are_skipped() {
        let sources = MemorySources::new()
            .add("protocol/README.md", "0001-TEST-001")
            .add("protocol/notes.md", "0001-TEST-001")
            .add("protocol/0001-TEST-intro.md", "0001-TEST-001");
        let specs = SpecFiles::collect(sources, &CategoryRegistry::from_config(Default::default()))
            .unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs.skipped(), ["notes.md"]);
        assert_eq!(
            specs.get("0001-TEST-intro.md").unwrap().categories,
            vec![UNKNOWN.to_string()]
        );
    }

    #[test]
    fn first_file_name_wins() {
        let sources = MemorySources::new()
            .add("a/0001-TEST-intro.md", "0001-TEST-001")
            .add("b/0001-TEST-intro.md", "0001-TEST-002");
        let specs = SpecFiles::collect(sources, &CategoryRegistry::new()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs.iter().next().unwrap().criteria, vec!["0001-TEST-001"]);
    }

    #[test]
    fn unset_categories_give_empty_list() {
        let registry = CategoryRegistry::new();
        assert_eq!(
            registry.categories_for_spec("0001-TEST"),
            Err(RegistryError::CategoriesNotSet)
        );
        let specs = SpecFiles::collect(
            MemorySources::new().add("0001-TEST-intro.md", "0001-TEST-001"),
            &registry,
        )
        .unwrap();
        assert!(specs.iter().next().unwrap().categories.is_empty());
    }

    #[test]
    fn np_specs_only_collect_their_own_codes() {
        let specs = SpecFiles::collect(
            MemorySources::new().add(
                "0011-NP-CLIE-client.md",
                "0011-NP-CLIE-001 0011-CLIE-002 0011-NP-CLIE-002",
            ),
            &CategoryRegistry::new(),
        )
        .unwrap();
        let spec = specs.get("0011-NP-CLIE-client.md").unwrap();
        assert_eq!(spec.criteria, vec!["0011-NP-CLIE-001", "0011-NP-CLIE-002"]);
        assert_eq!(spec.priority, 2);
        assert_eq!(
            specs.all_criteria().collect::<Vec<_>>(),
            vec!["0011-NP-CLIE-001", "0011-NP-CLIE-002"]
        );
    }
}
