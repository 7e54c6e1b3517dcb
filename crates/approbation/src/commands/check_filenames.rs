//! `approbation check-filenames`

use crate::files::{ignore_list, matching_files};
use crate::{CommandOutput, Status};
use approbation_core::{FilenamesReport, PathSources};
use eyre::Result;
use owo_colors::OwoColorize;

#[derive(Debug, Clone)]
pub struct CheckFilenamesOptions {
    pub specs: String,
    pub ignore: Option<String>,
    pub verbose: bool,
}

pub fn run(options: &CheckFilenamesOptions) -> Result<CommandOutput> {
    let ignored = ignore_list(options.ignore.as_deref())?;
    let files = matching_files("--specs", &options.specs, &ignored, "spec")?;
    let report = FilenamesReport::check(PathSources::new(files))?;
    Ok(CommandOutput::new(
        Status::from_ok(report.is_ok()),
        render(&report, options.verbose),
    ))
}

pub fn render(report: &FilenamesReport, verbose: bool) -> String {
    let mut output = String::new();

    for (file_name, issue) in &report.invalid {
        output.push_str(&format!("{}: {}\n", issue.red(), file_name));
    }
    for file_name in &report.empty {
        output.push_str(&format!("{}: {}\n", "Empty file".yellow(), file_name));
    }
    if verbose {
        for file_name in &report.valid {
            output.push_str(&format!("{}: {}\n", "OK".green(), file_name));
        }
    }

    let missing = report.missing_sequences();
    if !missing.is_empty() {
        let missing: Vec<String> = missing.iter().map(|n| format!("{n:04}")).collect();
        output.push_str(&format!("Missing sequence number: {}\n", missing.join(", ")));
    }

    output.push('\n');
    output.push_str(&format!(
        "{}    {}\n",
        "Correctly named".green().bold(),
        report.valid.len().bold()
    ));
    output.push_str(&format!(
        "{}             {}\n",
        "Errors".red().bold(),
        report.invalid.len().bold()
    ));
    output.push('\n');
    output
}
