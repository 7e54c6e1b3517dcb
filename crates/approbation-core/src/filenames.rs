//! Filename checker: `NNNN[-NP]-XXXX-descriptive_name.md`

use crate::patterns::{file_name_of, is_readme, parse_spec_filename};
use crate::sources::Sources;
use eyre::Result;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameIssue {
    /// Does not match the spec filename pattern
    Invalid,
    /// Uses the reserved sequence number `0000`
    ZeroSequence,
    /// Another file already uses this sequence (including any `-NP` marker)
    DuplicateSequence(String),
}

impl std::fmt::Display for FilenameIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilenameIssue::Invalid => f.write_str("Invalid filename"),
            FilenameIssue::ZeroSequence => f.write_str("Invalid sequence number 0000"),
            FilenameIssue::DuplicateSequence(sequence) => {
                write!(f, "Duplicate sequence number {sequence}")
            }
        }
    }
}

/// Summary of a check-filenames run
#[derive(Debug, Clone, Default)]
pub struct FilenamesReport {
    /// Correctly named files
    pub valid: Vec<String>,
    pub invalid: Vec<(String, FilenameIssue)>,
    /// Correctly named files with no content (a warning only)
    pub empty: Vec<String>,
    /// Sequence numbers used by at least one correctly named file
    pub sequences: BTreeSet<u32>,
}

impl FilenamesReport {
    /// Check every file name in `sources`. README files are ignored.
    pub fn check(sources: impl Sources) -> Result<Self> {
        let mut report = Self::default();
        let mut seen_sequences: Vec<String> = Vec::new();

        sources.visit(&mut |path, content| {
            if is_readme(path) {
                return Ok(());
            }
            let file_name = file_name_of(path);
            let Some(parsed) = parse_spec_filename(&file_name) else {
                report.invalid.push((file_name, FilenameIssue::Invalid));
                return Ok(());
            };

            let issue = if parsed.number() == 0 {
                Some(FilenameIssue::ZeroSequence)
            } else if seen_sequences.iter().any(|s| s == parsed.sequence) {
                Some(FilenameIssue::DuplicateSequence(parsed.sequence.to_string()))
            } else {
                seen_sequences.push(parsed.sequence.to_string());
                report.sequences.insert(parsed.number());
                None
            };

            if content.is_empty() {
                tracing::warn!("Empty file: {}", file_name);
                report.empty.push(file_name.clone());
            }

            match issue {
                Some(issue) => report.invalid.push((file_name, issue)),
                None => report.valid.push(file_name),
            }
            Ok(())
        })?;

        Ok(report)
    }

    /// Sequence numbers missing between the lowest and highest in use
    pub fn missing_sequences(&self) -> Vec<u32> {
        let (Some(&first), Some(&last)) = (self.sequences.first(), self.sequences.last()) else {
            return Vec::new();
        };
        (first..=last)
            .filter(|n| !self.sequences.contains(n))
            .collect()
    }

    pub fn file_count(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn is_ok(&self) -> bool {
        self.invalid.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySources;

    #[test]
    fn valid_and_invalid_names() {
        let report = FilenamesReport::check(
            MemorySources::new()
                .add("protocol/README.md", "")
                .add("protocol/0001-EXMP-example.md", "content")
                .add("protocol/0000-ZERO-zero.md", "content")
                .add("protocol/0001-DUPE-duplicate.md", "content")
                .add("protocol/0001-NP-CLIE-client.md", "content")
                .add("protocol/1-BAD-name.md", "content"),
        )
        .unwrap();

        assert_eq!(report.valid, vec!["0001-EXMP-example.md", "0001-NP-CLIE-client.md"]);
        assert_eq!(
            report.invalid,
            vec![
                ("0000-ZERO-zero.md".to_string(), FilenameIssue::ZeroSequence),
                (
                    "0001-DUPE-duplicate.md".to_string(),
                    FilenameIssue::DuplicateSequence("0001".to_string())
                ),
                ("1-BAD-name.md".to_string(), FilenameIssue::Invalid),
            ]
        );
        assert_eq!(report.file_count(), 5);
        assert!(!report.is_ok());
    }

    #[test]
    fn empty_files_only_warn() {
        let report =
            FilenamesReport::check(MemorySources::new().add("0002-EMPT-empty.md", "")).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.empty, vec!["0002-EMPT-empty.md"]);
    }

    #[test]
    fn gaps_in_sequence() {
        let report = FilenamesReport::check(
            MemorySources::new()
                .add("0001-AAAA-a.md", "x")
                .add("0002-BBBB-b.md", "x")
                .add("0005-EEEE-e.md", "x"),
        )
        .unwrap();
        assert_eq!(report.missing_sequences(), vec![3, 4]);
    }
}
