//! Source providers for spec and test files

use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};

/// Trait for providing the files a collector scans.
///
/// Files are visited in order, one at a time. README files are handed to the
/// visitor like any other file; collectors decide what to skip.
pub trait Sources {
    /// Call `visitor` with the path and text content of every file.
    fn visit(self, visitor: &mut dyn FnMut(&Path, &str) -> Result<()>) -> Result<()>;
}

/// Read a file as text. Invalid UTF-8 sequences are replaced rather than
/// rejected, since specs and tests are treated as plain ASCII.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Sources from an explicit list of file paths
#[derive(Debug, Clone, Default)]
pub struct PathSources(Vec<PathBuf>);

impl PathSources {
    /// Create from an iterator of paths
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self(paths.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.0
    }
}

impl Sources for PathSources {
    fn visit(self, visitor: &mut dyn FnMut(&Path, &str) -> Result<()>) -> Result<()> {
        for path in self.0 {
            let content = read_text(&path)?;
            visitor(path.as_path(), &content)?;
        }
        Ok(())
    }
}

/// In-memory sources (useful for testing)
#[derive(Debug, Clone, Default)]
pub struct MemorySources(Vec<(PathBuf, String)>);

impl MemorySources {
    /// Create empty memory sources
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a file with content
    pub fn add(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.0.push((path.into(), content.into()));
        self
    }
}

impl Sources for MemorySources {
    fn visit(self, visitor: &mut dyn FnMut(&Path, &str) -> Result<()>) -> Result<()> {
        for (path, content) in &self.0 {
            visitor(path.as_path(), content.as_str())?;
        }
        Ok(())
    }
}

/// Remove every path in `ignored` from `files`, preserving order.
///
/// Returns the remaining files and how many were removed.
pub fn without_ignored(files: Vec<PathBuf>, ignored: &[PathBuf]) -> (Vec<PathBuf>, usize) {
    if ignored.is_empty() {
        return (files, 0);
    }
    let before = files.len();
    let kept: Vec<PathBuf> = files
        .into_iter()
        .filter(|file| !ignored.iter().any(|ignore| ignore == file))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

#[cfg(feature = "walk")]
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Expand a glob pattern (`protocol/**/*.md`, `./tests/**/*.{feature,py}`)
/// into the matching files, sorted by path. A leading `./` is dropped from
/// both the pattern and the results, so expansions of two patterns compare
/// equal path for path.
///
/// Hidden files and directories are skipped. `.gitignore` rules are not
/// applied: the glob alone decides what is scanned.
#[cfg(feature = "walk")]
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    use globset::GlobBuilder;
    use ignore::WalkBuilder;

    let normalized = pattern.strip_prefix("./").unwrap_or(pattern);

    if !normalized.contains(GLOB_META) {
        let path = PathBuf::from(normalized);
        return Ok(if path.is_file() { vec![path] } else { Vec::new() });
    }

    let matcher = GlobBuilder::new(normalized)
        .literal_separator(true)
        .build()
        .wrap_err_with(|| format!("Invalid glob pattern '{}'", pattern))?
        .compile_matcher();

    let root = literal_base(normalized);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let walker = WalkBuilder::new(&root)
        .follow_links(true)
        .hidden(true) // Skip dotfiles, like most shell globs
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut matched = Vec::new();
    for entry in walker {
        let entry = entry.wrap_err_with(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        let candidate = path.strip_prefix(".").unwrap_or(path);
        if matcher.is_match(candidate) {
            matched.push(candidate.to_path_buf());
        }
    }

    matched.sort();
    Ok(matched)
}

/// The leading components of a pattern that contain no glob syntax.
#[cfg(feature = "walk")]
fn literal_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        if component.as_os_str().to_string_lossy().contains(GLOB_META) {
            break;
        }
        base.push(component);
    }
    if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base
    }
}
