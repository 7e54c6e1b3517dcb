//! Suggestions for the next free criterion number or spec sequence number

use crate::ac_code::criterion_numbers;
use crate::patterns::{file_name_of, find_criteria, is_readme, parse_spec_filename};
use crate::sources::Sources;
use eyre::Result;
use std::collections::BTreeSet;
use std::path::Path;

/// The lowest number (from 1) not in `used`.
pub fn lowest_unused(used: impl IntoIterator<Item = u32>) -> u32 {
    let used: BTreeSet<u32> = used.into_iter().collect();
    let mut lowest = 1;
    while used.contains(&lowest) {
        lowest += 1;
    }
    lowest
}

/// One past the highest number in `used`, or 1 when nothing is used.
pub fn next_highest(used: impl IntoIterator<Item = u32>) -> u32 {
    used.into_iter().max().map_or(1, |max| max + 1)
}

/// Next criterion numbers for one spec file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextCode {
    pub file_name: String,
    pub prefix: String,
    /// Criterion numbers already used, ascending
    pub used: Vec<u32>,
    pub next_highest: u32,
    pub lowest_unused: u32,
}

impl NextCode {
    /// `None` when the file name is not a valid spec filename.
    pub fn for_spec(path: &Path, content: &str) -> Option<Self> {
        let file_name = file_name_of(path);
        let prefix = parse_spec_filename(&file_name)?.prefix();
        let used: BTreeSet<u32> = criterion_numbers(find_criteria(&prefix, content))
            .into_iter()
            .collect();
        let used: Vec<u32> = used.into_iter().collect();

        Some(Self {
            next_highest: next_highest(used.iter().copied()),
            lowest_unused: lowest_unused(used.iter().copied()),
            used,
            file_name,
            prefix,
        })
    }

    /// Example AC code for a criterion number, e.g. `0001-EXMP-004`
    pub fn example(&self, number: u32) -> String {
        format!("{}-{:03}", self.prefix, number)
    }

    /// Whether there is a gap below the highest used number
    pub fn has_gap(&self) -> bool {
        self.lowest_unused != self.next_highest
    }
}

/// Next sequence numbers for a set of spec files
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NextFilename {
    /// Valid file names considered, in scan order
    pub files: Vec<String>,
    pub used: Vec<u32>,
    pub next_highest: u32,
    pub lowest_unused: u32,
}

impl NextFilename {
    /// Collect sequence numbers from every valid, non-`0000` spec filename
    /// in `sources`. README files and invalid names are ignored.
    pub fn collect(sources: impl Sources) -> Result<Self> {
        let mut files = Vec::new();
        let mut used = BTreeSet::new();
        sources.visit(&mut |path, _| {
            if is_readme(path) {
                return Ok(());
            }
            let file_name = file_name_of(path);
            if let Some(parsed) = parse_spec_filename(&file_name) {
                let number = parsed.number();
                if number != 0 {
                    used.insert(number);
                    files.push(file_name.clone());
                }
            }
            Ok(())
        })?;

        let used: Vec<u32> = used.into_iter().collect();
        Ok(Self {
            files,
            next_highest: next_highest(used.iter().copied()),
            lowest_unused: lowest_unused(used.iter().copied()),
            used,
        })
    }

    /// Example file name for a sequence number
    pub fn example(number: u32) -> String {
        format!("{number:04}-XXXX-descriptive_name.md")
    }

    pub fn has_gap(&self) -> bool {
        self.lowest_unused != self.next_highest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySources;

    #[test]
    fn lowest_unused_starts_at_one() {
        assert_eq!(lowest_unused(std::iter::empty()), 1);
        assert_eq!(lowest_unused([1, 2, 3]), 4);
        assert_eq!(lowest_unused([2, 3]), 1);
        assert_eq!(lowest_unused([3, 1, 2, 5]), 4);
    }

    #[test]
    fn next_highest_after_max() {
        assert_eq!(next_highest(std::iter::empty()), 1);
        assert_eq!(next_highest([1, 7, 3]), 8);
    }

    #[test]
    fn next_code_for_spec() {
        let next = NextCode::for_spec(
            Path::new("protocol/0001-EXMP-example.md"),
            "0001-EXMP-000 0001-EXMP-001 0001-EXMP-003 0001-EXMP-001",
        )
        .unwrap();
        assert_eq!(next.prefix, "0001-EXMP");
        assert_eq!(next.used, vec![1, 3]);
        assert_eq!(next.next_highest, 4);
        assert_eq!(next.lowest_unused, 2);
        assert!(next.has_gap());
        assert_eq!(next.example(next.next_highest), "0001-EXMP-004");
    }

    #[test]
    fn next_code_without_criteria() {
        let next = NextCode::for_spec(Path::new("0011-NP-CLIE-client.md"), "").unwrap();
        assert_eq!(next.next_highest, 1);
        assert!(!next.has_gap());
        assert_eq!(next.example(1), "0011-NP-CLIE-001");
    }

    #[test]
    fn next_filename_skips_invalid_and_zero() {
        let next = NextFilename::collect(
            MemorySources::new()
                .add("0000-ZERO-zero.md", "")
                .add("0001-AAAA-a.md", "")
                .add("0003-CCCC-c.md", "")
                .add("0003-NP-DDDD-d.md", "")
                .add("README.md", "")
                .add("notes.md", ""),
        )
        .unwrap();
        assert_eq!(next.used, vec![1, 3]);
        assert_eq!(next.next_highest, 4);
        assert_eq!(next.lowest_unused, 2);
        assert_eq!(NextFilename::example(4), "0004-XXXX-descriptive_name.md");
        assert_eq!(next.files.len(), 3);
    }
}
