//! `approbation check-codes`

use crate::files::{ignore_list, matching_files};
use crate::{CommandOutput, Status};
use approbation_core::{CodeIssue, CodesReport, FileCodes, PathSources};
use eyre::Result;
use owo_colors::OwoColorize;

#[derive(Debug, Clone)]
pub struct CheckCodesOptions {
    pub specs: String,
    pub ignore: Option<String>,
    /// Minimum ACs for a spec to be acceptable
    pub minimum: usize,
    pub verbose: bool,
}

pub fn run(options: &CheckCodesOptions) -> Result<CommandOutput> {
    let ignored = ignore_list(options.ignore.as_deref())?;
    let files = matching_files("--specs", &options.specs, &ignored, "spec")?;
    let report = CodesReport::check(PathSources::new(files), options.minimum)?;

    let mut text = render(&report, options.verbose);
    if !report.is_ok() {
        text.push_str(&format!("{}\n", "Too many errors".red()));
    }
    Ok(CommandOutput::new(Status::from_ok(report.is_ok()), text))
}

fn render_file(file: &FileCodes, verbose: bool) -> String {
    let mut output = String::new();
    if file.issues.is_empty() {
        if verbose {
            output.push_str(&format!(
                "{}\n  {} acceptance criteria\n",
                file.path.display().bold(),
                file.criteria.green()
            ));
        }
        return output;
    }

    output.push_str(&format!("{}\n", file.path.display().bold()));
    for issue in &file.issues {
        match issue {
            CodeIssue::NoCriteria => {
                output.push_str(&format!("  {}\n", "no acceptance criteria".yellow()));
            }
            CodeIssue::Duplicates(codes) => {
                output.push_str(&format!(
                    "  {} {}\n",
                    "Found multiple uses of the same code:".red(),
                    codes.join(", ")
                ));
            }
            CodeIssue::Unbalanced(chunks) => {
                output.push_str(&format!(
                    "  {} acceptance criteria\n  {}\n",
                    file.criteria,
                    "Found something odd:".red()
                ));
                for chunk in chunks {
                    output.push_str(&format!("    [{}]\n", chunk.join(", ")));
                }
            }
            CodeIssue::TooFew { found, minimum } => {
                output.push_str(&format!(
                    "  {} acceptance criteria (minimum {})\n",
                    found.red(),
                    minimum
                ));
            }
        }
    }
    output
}

pub fn render(report: &CodesReport, verbose: bool) -> String {
    let mut output = String::new();
    for file in &report.files {
        output.push_str(&render_file(file, verbose));
    }

    output.push_str("\n--------------------------------------------------\n");
    output.push_str(&format!(
        "Acceptable         {} (files with at least {} ACs)\n",
        report.acceptable_files(),
        report.minimum
    ));
    output.push_str(&format!("Need work          {}\n", report.empty_files()));
    output.push_str(&format!("Files with errors  {}\n", report.error_files()));
    output.push_str(&format!("Total ACs          {}\n", report.total_criteria()));
    output.push_str(&format!("Unique codes       {}\n", report.unique_codes().len()));
    if !report.skipped.is_empty() {
        output.push_str(&format!("Skipped            {}\n", report.skipped.len()));
    }
    output.push('\n');
    output
}
