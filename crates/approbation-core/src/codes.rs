//! Codes checker: are acceptance criteria written as self-linking anchors?
//!
//! Every criterion in `0001-EXMP-example.md` is expected to appear as
//!
//! ```text
//! <a name="0001-EXMP-001" href="#0001-EXMP-001">0001-EXMP-001</a>
//! ```
//!
//! so each code occurs three times in a row. Occurrences are split into
//! chunks of three; a chunk holding more than one distinct code, or a code
//! spread over several chunks, points at a malformed anchor.

use crate::patterns::{file_name_of, find_criteria, is_readme, spec_prefix};
use crate::registry::find_duplicate_acs;
use crate::sources::Sources;
use eyre::Result;
use std::collections::HashSet;
use std::path::PathBuf;

/// Occurrences of one code in a well-formed anchor
pub const ANCHOR_OCCURRENCES: usize = 3;

/// Default minimum number of criteria for a spec to be acceptable
pub const DEFAULT_MINIMUM_CRITERIA: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeIssue {
    /// No occurrence of the spec's own prefix at all
    NoCriteria,
    /// Codes that appear in more than one anchor
    Duplicates(Vec<String>),
    /// Raw chunks, at least one of which mixes codes
    Unbalanced(Vec<Vec<String>>),
    /// Fewer criteria than the configured minimum
    TooFew { found: usize, minimum: usize },
}

impl CodeIssue {
    /// `NoCriteria` marks a file as needing work; the others are errors.
    pub fn is_error(&self) -> bool {
        !matches!(self, CodeIssue::NoCriteria)
    }
}

/// Check results for one spec file
#[derive(Debug, Clone)]
pub struct FileCodes {
    pub path: PathBuf,
    pub file_name: String,
    /// Number of anchors (chunks)
    pub criteria: usize,
    /// Distinct codes in first-seen order
    pub unique_codes: Vec<String>,
    pub issues: Vec<CodeIssue>,
}

impl FileCodes {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(CodeIssue::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.contains(&CodeIssue::NoCriteria)
    }
}

/// Check one file's content against its prefix.
pub fn check_file(path: PathBuf, prefix: &str, content: &str, minimum: usize) -> FileCodes {
    let matches = find_criteria(prefix, content);
    let file_name = file_name_of(&path);
    let mut issues = Vec::new();

    if matches.is_empty() {
        issues.push(CodeIssue::NoCriteria);
        return FileCodes {
            path,
            file_name,
            criteria: 0,
            unique_codes: Vec::new(),
            issues,
        };
    }

    let chunks: Vec<Vec<&str>> = matches
        .chunks(ANCHOR_OCCURRENCES)
        .map(|chunk| chunk.to_vec())
        .collect();
    let distinct_per_chunk: Vec<Vec<&str>> = chunks
        .iter()
        .map(|chunk| {
            let mut seen = HashSet::new();
            chunk.iter().copied().filter(|c| seen.insert(*c)).collect()
        })
        .collect();

    let flattened: Vec<&str> = distinct_per_chunk.iter().flatten().copied().collect();
    let duplicates = find_duplicate_acs(&flattened);
    if !duplicates.is_empty() {
        issues.push(CodeIssue::Duplicates(
            duplicates.into_iter().map(str::to_string).collect(),
        ));
    }

    if distinct_per_chunk.iter().any(|chunk| chunk.len() != 1) {
        issues.push(CodeIssue::Unbalanced(
            chunks
                .iter()
                .map(|chunk| chunk.iter().map(|c| c.to_string()).collect())
                .collect(),
        ));
    }

    let criteria = distinct_per_chunk.len();
    if criteria < minimum {
        issues.push(CodeIssue::TooFew {
            found: criteria,
            minimum,
        });
    }

    let mut seen = HashSet::new();
    let unique_codes = matches
        .iter()
        .filter(|c| seen.insert(**c))
        .map(|c| c.to_string())
        .collect();

    FileCodes {
        path,
        file_name,
        criteria,
        unique_codes,
        issues,
    }
}

/// Summary of a check-codes run
#[derive(Debug, Clone, Default)]
pub struct CodesReport {
    pub files: Vec<FileCodes>,
    /// File names without a valid spec prefix
    pub skipped: Vec<String>,
    pub minimum: usize,
}

impl CodesReport {
    /// Check every spec file in `sources`. README files are ignored.
    pub fn check(sources: impl Sources, minimum: usize) -> Result<Self> {
        let mut report = Self {
            minimum,
            ..Self::default()
        };
        sources.visit(&mut |path, content| {
            if is_readme(path) {
                return Ok(());
            }
            let file_name = file_name_of(path);
            let Some(prefix) = spec_prefix(&file_name) else {
                tracing::warn!("Skipping {} (does not start with a spec prefix)", file_name);
                report.skipped.push(file_name);
                return Ok(());
            };
            let checked = check_file(path.to_path_buf(), prefix, content, minimum);
            report.files.push(checked);
            Ok(())
        })?;
        Ok(report)
    }

    /// Files with at least `minimum` criteria
    pub fn acceptable_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !f.is_empty() && f.criteria >= self.minimum)
            .count()
    }

    /// Files without any criteria
    pub fn empty_files(&self) -> usize {
        self.files.iter().filter(|f| f.is_empty()).count()
    }

    pub fn error_files(&self) -> usize {
        self.files.iter().filter(|f| f.has_errors()).count()
    }

    pub fn total_criteria(&self) -> usize {
        self.files.iter().map(|f| f.criteria).sum()
    }

    /// Distinct codes over all files, in first-seen order
    pub fn unique_codes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.files
            .iter()
            .flat_map(|f| f.unique_codes.iter().map(String::as_str))
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Number of spec files checked (skipped files excluded)
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_ok(&self) -> bool {
        self.error_files() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySources;
    use indoc::indoc;

    fn anchor(code: &str) -> String {
        format!(r##"<a name="{code}" href="#{code}">{code}</a>"##)
    }

    #[test]
    fn well_formed_anchors() {
        let content = format!("{}\n{}\n", anchor("0001-EXMP-001"), anchor("0001-EXMP-002"));
        let checked = check_file(PathBuf::from("0001-EXMP-example.md"), "0001-EXMP", &content, 1);
        assert!(checked.issues.is_empty());
        assert_eq!(checked.criteria, 2);
        assert_eq!(checked.unique_codes, vec!["0001-EXMP-001", "0001-EXMP-002"]);
    }

    #[test]
    fn duplicated_anchor_is_an_error() {
        let content = format!("{}\n{}\n", anchor("0001-EXMP-001"), anchor("0001-EXMP-001"));
        let checked = check_file(PathBuf::from("0001-EXMP-example.md"), "0001-EXMP", &content, 1);
        assert_eq!(
            checked.issues,
            vec![CodeIssue::Duplicates(vec!["0001-EXMP-001".to_string()])]
        );
        assert!(checked.has_errors());
    }

    #[test]
    fn broken_anchor_is_unbalanced() {
        let content = indoc! {r##"
            <a name="0001-EXMP-001" href="#0001-EXMP-002">0001-EXMP-001</a>
        "##};
        let checked = check_file(PathBuf::from("0001-EXMP-example.md"), "0001-EXMP", content, 1);
        assert!(matches!(checked.issues[0], CodeIssue::Unbalanced(_)));
    }

    #[test]
    fn minimum_is_enforced() {
        let content = anchor("0001-EXMP-001");
        let checked = check_file(PathBuf::from("0001-EXMP-example.md"), "0001-EXMP", &content, 2);
        assert_eq!(
            checked.issues,
            vec![CodeIssue::TooFew {
                found: 1,
                minimum: 2
            }]
        );
    }

    #[test]
    fn report_counts() {
        let sources = MemorySources::new()
            .add("README.md", "0001-EXMP-001")
            .add("0001-EXMP-example.md", anchor("0001-EXMP-001"))
            .add("0002-EMPT-empty.md", "Nothing here yet")
            .add(
                "0003-DUPE-dupes.md",
                format!("{}{}", anchor("0003-DUPE-001"), anchor("0003-DUPE-001")),
            )
            .add("notes.md", "0001-EXMP-009");
        let report = CodesReport::check(sources, DEFAULT_MINIMUM_CRITERIA).unwrap();

        assert_eq!(report.file_count(), 3);
        assert_eq!(report.skipped, vec!["notes.md"]);
        assert_eq!(report.empty_files(), 1);
        assert_eq!(report.error_files(), 1);
        assert_eq!(report.acceptable_files(), 2);
        assert_eq!(report.total_criteria(), 3);
        assert_eq!(report.unique_codes(), vec!["0001-EXMP-001", "0003-DUPE-001"]);
        assert!(!report.is_ok());
    }
}
