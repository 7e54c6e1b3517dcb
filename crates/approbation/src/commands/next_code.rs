//! `approbation next-code`: the next free AC number in one spec

use crate::files::{ignore_list, matching_files};
use crate::{CommandOutput, Status};
use approbation_core::patterns::is_readme;
use approbation_core::{NextCode, read_text};
use eyre::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct NextCodeOptions {
    /// Glob that must match exactly one spec
    pub specs: String,
    pub ignore: Option<String>,
    pub verbose: bool,
}

pub fn run(options: &NextCodeOptions) -> Result<CommandOutput> {
    let ignored = ignore_list(options.ignore.as_deref())?;
    let files: Vec<PathBuf> = matching_files("--specs", &options.specs, &ignored, "spec")?
        .into_iter()
        .filter(|path| !is_readme(path))
        .collect();

    let [file] = files.as_slice() else {
        let message = if files.is_empty() {
            format!("glob matched no spec files ({})", options.specs)
        } else {
            format!("glob matched more than one file ({})", options.specs)
        };
        return Ok(CommandOutput::new(
            Status::Failed,
            format!("{}\n", message.red()),
        ));
    };

    let content = read_text(file)?;
    let Some(next) = NextCode::for_spec(file, &content) else {
        return Ok(CommandOutput::new(
            Status::Failed,
            format!(
                "{}\n",
                format!("{} is not a valid spec filename", file.display()).red()
            ),
        ));
    };

    Ok(CommandOutput::new(Status::Passed, render(&next, options.verbose)))
}

pub fn render(next: &NextCode, verbose: bool) -> String {
    let mut output = format!("In file: {}\n", next.file_name);
    if verbose {
        let used: Vec<String> = next
            .used
            .iter()
            .map(|n| format!("{n:03}").green().to_string())
            .collect();
        output.push_str(&format!("Found codes: {}\n", used.join(", ")));
    }

    let qualifier = if next.has_gap() { "highest " } else { "" };
    let n = format!("{:03}", next.next_highest);
    output.push_str(&format!(
        "Next {}sequence number: {} (e.g. {})\n",
        qualifier,
        n.green(),
        next.example(next.next_highest).green()
    ));

    if next.has_gap() {
        let n = format!("{:03}", next.lowest_unused);
        output.push_str(&format!(
            "Lowest unused sequence number: {} (e.g. {}) - {}\n",
            n.green(),
            next.example(next.lowest_unused).green(),
            "Remember to check this is not referenced in a test!".red()
        ));
    }
    output
}
