//! `--show-branches`: which branch each checked-out project is on
//!
//! Every subdirectory of the working directory that is a git checkout is
//! assumed to be a project whose specs or tests are being scanned.

use eyre::{Result, WrapErr, bail};
use owo_colors::OwoColorize;
use std::path::Path;

/// Branch and commit of one project directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectBranch {
    pub project: String,
    pub branch: String,
    pub commit: String,
}

/// Run a git command in `dir` and capture trimmed stdout.
pub fn git_capture(dir: &Path, args: &[&str]) -> Result<String> {
    let out = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .wrap_err("failed to run git")?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }

    String::from_utf8(out.stdout)
        .map(|s| s.trim().to_string())
        .wrap_err_with(|| format!("git {} output is not valid UTF-8", args.join(" ")))
}

/// Branches of every git checkout directly under `root`, in name order.
/// Directories where git fails are logged and skipped.
pub fn project_branches(root: &Path) -> Result<Vec<ProjectBranch>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root)
        .wrap_err_with(|| format!("Failed to list {}", root.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && path.join(".git").exists() {
            dirs.push(path);
        }
    }
    dirs.sort();

    let mut branches = Vec::new();
    for dir in dirs {
        let project = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let lookup = git_capture(&dir, &["rev-parse", "--abbrev-ref", "HEAD"]).and_then(
            |branch| {
                let commit = git_capture(&dir, &["rev-parse", "--short", "HEAD"])?;
                Ok((branch, commit))
            },
        );
        match lookup {
            Ok((branch, commit)) => branches.push(ProjectBranch {
                project,
                branch,
                commit,
            }),
            Err(e) => tracing::warn!("Could not check git branch for {}: {}", project, e),
        }
    }
    Ok(branches)
}

/// main/master green, develop yellow, anything else red
pub fn colour_branch(branch: &str) -> String {
    match branch {
        "main" | "master" => branch.green().to_string(),
        "develop" => branch.yellow().to_string(),
        _ => branch.red().to_string(),
    }
}

pub fn render_branches(branches: &[ProjectBranch]) -> String {
    let mut output = format!("{}\n", "Project branches".bold());
    for b in branches {
        output.push_str(&format!(
            "  {}: {} @ {}\n",
            b.project.bold(),
            colour_branch(&b.branch),
            b.commit
        ));
    }
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_directories_are_not_projects() {
        let dir = tempfile::Builder::new()
            .prefix("approbation-branches")
            .tempdir()
            .unwrap();
        std::fs::create_dir(dir.path().join("protocol")).unwrap();
        assert!(project_branches(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn branch_colours() {
        assert_eq!(colour_branch("main"), "main".green().to_string());
        assert_eq!(colour_branch("develop"), "develop".yellow().to_string());
        assert_eq!(colour_branch("feature/x"), "feature/x".red().to_string());
    }
}
