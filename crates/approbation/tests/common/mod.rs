//! Common test utilities.

#![allow(dead_code)]

use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));

/// Get the path to the test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Fixture project with two specs, a feature file and a system test.
pub fn project_dir() -> PathBuf {
    fixtures_dir().join("project")
}

/// Specs with bad filenames and malformed anchors.
pub fn broken_dir() -> PathBuf {
    fixtures_dir().join("broken")
}

/// Output of one binary run, with colours stripped
pub struct Run {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Run {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Run the approbation binary in `dir`.
pub fn approbation(dir: &Path, args: &[&str]) -> Run {
    let output = Command::new(env!("CARGO_BIN_EXE_approbation"))
        .args(args)
        .current_dir(dir)
        .env_remove("APPROBATION_LOG")
        .output()
        .expect("Failed to run approbation");

    Run {
        code: output.status.code(),
        stdout: strip_ansi(&String::from_utf8_lossy(&output.stdout)),
        stderr: strip_ansi(&String::from_utf8_lossy(&output.stderr)),
    }
}

/// Create a temporary directory for test isolation.
pub fn temp_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("approbation-test")
        .tempdir()
        .expect("Failed to create temp dir")
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(&path, content).expect("Failed to write fixture file");
}

/// A self-linking AC anchor
pub fn anchor(code: &str) -> String {
    format!("<a name=\"{code}\" href=\"#{code}\">{code}</a>")
}
