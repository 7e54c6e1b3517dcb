//! Turning `--specs`, `--tests` and `--ignore` globs into file lists

use approbation_core::{expand_glob, without_ignored};
use eyre::{Result, WrapErr};
use std::path::PathBuf;

/// A required input glob matched nothing (after removing ignored files).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{flag} matched no files ({pattern})")]
pub struct NoFilesMatched {
    pub flag: String,
    pub pattern: String,
}

/// Expand the optional `--ignore` glob.
pub fn ignore_list(ignore: Option<&str>) -> Result<Vec<PathBuf>> {
    match ignore {
        Some(pattern) => expand_glob(pattern)
            .wrap_err_with(|| format!("Failed to expand --ignore glob '{}'", pattern)),
        None => Ok(Vec::new()),
    }
}

/// Expand `pattern`, drop ignored files, and fail with [`NoFilesMatched`]
/// when nothing is left. `kind` names the files in log messages.
pub fn matching_files(
    flag: &str,
    pattern: &str,
    ignored: &[PathBuf],
    kind: &str,
) -> Result<Vec<PathBuf>> {
    let files = expand_glob(pattern)
        .wrap_err_with(|| format!("Failed to expand {} glob '{}'", flag, pattern))?;
    let (files, removed) = without_ignored(files, ignored);
    if removed > 0 {
        tracing::info!("Ignore matched {} {} files", removed, kind);
    }
    if files.is_empty() {
        return Err(NoFilesMatched {
            flag: flag.to_string(),
            pattern: pattern.to_string(),
        }
        .into());
    }
    tracing::debug!("{} matched {} {} files", flag, files.len(), kind);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_match_is_a_typed_error() {
        let err = matching_files("--specs", "does-not-exist/**/*.md", &[], "spec").unwrap_err();
        let no_files = err.downcast_ref::<NoFilesMatched>().expect("typed error");
        assert_eq!(no_files.flag, "--specs");
        assert_eq!(
            err.to_string(),
            "--specs matched no files (does-not-exist/**/*.md)"
        );
    }

    #[test]
    fn everything_ignored_counts_as_no_match() {
        let dir = tempfile::Builder::new()
            .prefix("approbation-files")
            .tempdir()
            .unwrap();
        let spec = dir.path().join("0001-EXMP-example.md");
        std::fs::write(&spec, "0001-EXMP-001").unwrap();
        let pattern = format!("{}/*.md", dir.path().display());

        assert_eq!(matching_files("--specs", &pattern, &[], "spec").unwrap(), vec![spec.clone()]);
        let err = matching_files("--specs", &pattern, &[spec], "spec").unwrap_err();
        assert!(err.downcast_ref::<NoFilesMatched>().is_some());
    }
}
