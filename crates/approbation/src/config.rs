//! Project configuration for approbation
//!
//! Config lives at `.config/approbation/config.styx` relative to the working
//! directory and supplies defaults for command-line flags:
//!
//! ```styx
//! specs "protocol/**/*.md"
//! tests "qa-scenarios/**/*.{feature,py}"
//! categories "specs/categories.json"
//! features "specs/features.json"
//! current_milestone "colosseo_II"
//! ```
//!
//! Flags given on the command line always win over config values.

use eyre::{Result, WrapErr};
use facet::Facet;
use std::path::{Path, PathBuf};

/// Default config location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = ".config/approbation/config.styx";

/// Default directory for CSV and CI summary output
pub const DEFAULT_OUTPUT_DIR: &str = "./results";

/// Root configuration for approbation
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Glob matching spec files
    #[facet(default)]
    pub specs: Option<String>,

    /// Glob matching test artifacts
    #[facet(default)]
    pub tests: Option<String>,

    /// Glob of files to leave out of both lists
    #[facet(default)]
    pub ignore: Option<String>,

    /// Path to the categories JSON file
    #[facet(default)]
    pub categories: Option<String>,

    /// Path to the features JSON file
    #[facet(default)]
    pub features: Option<String>,

    /// Milestone reported in the CI summary
    #[facet(default)]
    pub current_milestone: Option<String>,

    /// Directory for CSV and CI summary files
    #[facet(default)]
    pub output: Option<String>,

    /// Minimum ACs per spec for check-codes
    #[facet(default)]
    pub minimum_criteria: Option<usize>,
}

impl Config {
    /// Load the config at `path` (must exist).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        facet_styx::from_str(&content)
            .map_err(|e| eyre::eyre!("{e}"))
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the config passed with `--config`, or the default config when it
    /// exists. No config at the default location is not an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    eyre::bail!("Config file not found at {}", path.display());
                }
                Self::load(path)
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    tracing::debug!("Using config from {}", path.display());
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Flag value if given, else config value, else an error naming the flag.
    pub fn require(flag: &str, cli: Option<String>, config: &Option<String>) -> Result<String> {
        cli.or_else(|| config.clone()).ok_or_else(|| {
            eyre::eyre!(
                "Missing --{}: pass it on the command line or set `{}` in {}",
                flag,
                flag,
                DEFAULT_CONFIG_PATH
            )
        })
    }

    /// Flag value if given, else config value.
    pub fn pick(cli: Option<String>, config: &Option<String>) -> Option<String> {
        cli.or_else(|| config.clone())
    }

    /// Output directory from the flag, config, or the default.
    pub fn output_dir(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.output.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_win_over_config() {
        let config = Config {
            specs: Some("protocol/**/*.md".to_string()),
            ..Config::default()
        };
        assert_eq!(
            Config::require("specs", Some("other/*.md".to_string()), &config.specs).unwrap(),
            "other/*.md"
        );
        assert_eq!(
            Config::require("specs", None, &config.specs).unwrap(),
            "protocol/**/*.md"
        );
        let err = Config::require("tests", None, &config.tests).unwrap_err();
        assert!(err.to_string().contains("--tests"));
    }

    #[test]
    fn output_dir_defaults() {
        let config = Config::default();
        assert_eq!(config.output_dir(None), PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(
            config.output_dir(Some(PathBuf::from("out"))),
            PathBuf::from("out")
        );
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = Config::discover(Some(Path::new("no/such/config.styx"))).unwrap_err();
        assert!(err.to_string().contains("no/such/config.styx"));
    }
}
