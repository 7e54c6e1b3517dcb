//! `approbation next-filename`: the next free spec sequence number

use crate::files::{ignore_list, matching_files};
use crate::{CommandOutput, Status};
use approbation_core::{NextFilename, PathSources};
use eyre::Result;
use owo_colors::OwoColorize;

#[derive(Debug, Clone)]
pub struct NextFilenameOptions {
    pub specs: String,
    pub ignore: Option<String>,
    pub verbose: bool,
}

pub fn run(options: &NextFilenameOptions) -> Result<CommandOutput> {
    let ignored = ignore_list(options.ignore.as_deref())?;
    let files = matching_files("--specs", &options.specs, &ignored, "spec")?;
    let next = NextFilename::collect(PathSources::new(files))?;
    Ok(CommandOutput::new(Status::Passed, render(&next, options.verbose)))
}

pub fn render(next: &NextFilename, verbose: bool) -> String {
    let mut output = String::new();
    if verbose {
        let files: Vec<String> = next.files.iter().map(|f| f.green().to_string()).collect();
        output.push_str(&format!("Files that matched: {}\n", files.join(", ")));
    }

    let qualifier = if next.has_gap() { "highest " } else { "" };
    output.push_str(&format!(
        "Next {}sequence number: {} (e.g. {})\n",
        qualifier,
        format!("{:04}", next.next_highest).green(),
        NextFilename::example(next.next_highest).green()
    ));

    if next.has_gap() {
        output.push_str(&format!(
            "Lowest unused sequence number: {} (e.g. {})\n",
            format!("{:04}", next.lowest_unused).green(),
            NextFilename::example(next.lowest_unused).green()
        ));
    }
    output
}
