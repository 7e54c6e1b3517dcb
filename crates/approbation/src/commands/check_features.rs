//! `approbation check-features`
//!
//! Validates a features JSON file against the scanned specs: every feature
//! must be well formed, list each AC once, and only list ACs some spec
//! declares.

use crate::files::{ignore_list, matching_files};
use crate::{CommandOutput, Status};
use approbation_core::{
    CategoryRegistry, FeatureIssues, FeatureRegistry, PathSources, RejectedFeature, SpecFiles,
};
use eyre::Result;
use owo_colors::OwoColorize;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CheckFeaturesOptions {
    pub specs: String,
    pub features: PathBuf,
    pub ignore: Option<String>,
    pub verbose: bool,
}

pub fn run(options: &CheckFeaturesOptions) -> Result<CommandOutput> {
    let ignored = ignore_list(options.ignore.as_deref())?;
    let files = matching_files("--specs", &options.specs, &ignored, "spec")?;
    let features = FeatureRegistry::load(&options.features)?;
    let specs = SpecFiles::collect(PathSources::new(files), &CategoryRegistry::new())?;

    let declared: HashSet<&str> = specs.all_criteria().collect();
    let issues = features.audit(&declared);

    let mut text = String::new();
    text.push_str(&render_rejected(features.rejected()));
    text.push_str(&render_feature_issues(&issues));
    if options.verbose {
        for feature in features.iter().filter(|f| !f.is_unknown()) {
            text.push_str(&format!(
                "{} ({}): {} ACs\n",
                feature.name.bold(),
                feature.milestone,
                feature.acs.len()
            ));
        }
    }

    let ok = issues.is_empty() && features.rejected().is_empty();
    if ok {
        text.push_str(&format!(
            "{} {} features checked against {} specs\n",
            "OK".green().bold(),
            features.iter().filter(|f| !f.is_unknown()).count(),
            specs.len()
        ));
    }
    Ok(CommandOutput::new(Status::from_ok(ok), text))
}

pub fn render_rejected(rejected: &[RejectedFeature]) -> String {
    let mut output = String::new();
    for r in rejected {
        output.push_str(&format!(
            "{} '{}': {}\n",
            "Invalid feature".red().bold(),
            r.name,
            r.defect
        ));
    }
    if !rejected.is_empty() {
        output.push('\n');
    }
    output
}

/// Duplicate, mystery and uncovered ACs, grouped per feature
pub fn render_feature_issues(issues: &[FeatureIssues]) -> String {
    let mut output = String::new();
    for issue in issues {
        let label = format!("{}({})", issue.feature, issue.milestone);
        output.push_str(&format!(
            "{}\n",
            format!("Feature errors: {}", issue.feature).bold()
        ));
        if !issue.duplicate_acs.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                format!("Duplicate ACs for {label}").red().bold(),
                issue.duplicate_acs.join(", ")
            ));
        }
        if !issue.mystery_acs.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                format!("Mystery ACs for {label}").red().bold(),
                issue.mystery_acs.join(", ")
            ));
        }
        if !issue.uncovered_acs.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                format!("Uncovered ACs for {label}:").red(),
                issue.uncovered_acs.join(", ")
            ));
        }
        output.push('\n');
    }
    output
}
