//! Test collection: which files mention which AC codes

use crate::patterns::{find_ac_codes, is_readme};
use crate::sources::Sources;
use eyre::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Path fragment marking a system test
pub const SYSTEM_TEST_MARKER: &str = "system-tests";

/// File extension marking a feature test
pub const FEATURE_TEST_EXTENSION: &str = "feature";

/// AC code to the distinct files that mention it, in scan order.
///
/// The reference aggregator takes entries out as it matches them against
/// spec criteria, so whatever is left afterwards is the set of mystery codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestReferences {
    refs: BTreeMap<String, Vec<PathBuf>>,
}

impl TestReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `sources` for AC-code-shaped substrings. README files are ignored.
    pub fn collect(sources: impl Sources) -> Result<Self> {
        let mut references = Self::new();
        sources.visit(&mut |path, content| {
            if is_readme(path) {
                return Ok(());
            }
            for code in find_ac_codes(content) {
                references.add(code, path);
            }
            Ok(())
        })?;
        tracing::debug!("Found {} distinct AC codes in tests", references.len());
        Ok(references)
    }

    /// Record that `path` mentions `code`.
    pub fn add(&mut self, code: &str, path: &Path) {
        let files = self.refs.entry(code.to_string()).or_default();
        if !files.iter().any(|f| f == path) {
            files.push(path.to_path_buf());
        }
    }

    pub fn get(&self, code: &str) -> Option<&[PathBuf]> {
        self.refs.get(code).map(Vec::as_slice)
    }

    /// Remove and return the files referencing `code`.
    pub fn take(&mut self, code: &str) -> Option<Vec<PathBuf>> {
        self.refs.remove(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.refs.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Entries in code order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.refs.iter().map(|(code, files)| (code.as_str(), files.as_slice()))
    }
}

/// Whether a referring file is a system test
pub fn is_system_test(path: &Path) -> bool {
    path.to_string_lossy().contains(SYSTEM_TEST_MARKER)
}

/// Whether a referring file is a feature test
pub fn is_feature_test(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == FEATURE_TEST_EXTENSION)
}
