//! approbation - Check acceptance criteria coverage across a spec corpus
//!
//! Specs declare acceptance criteria as anchored codes (`0001-EXMP-001`);
//! tests mention them. approbation cross-references the two, checks that
//! spec files and their codes are well formed, and suggests the next free
//! codes and filenames.

use approbation::commands::{
    self, CheckCodesOptions, CheckFeaturesOptions, CheckFilenamesOptions, NextCodeOptions,
    NextFilenameOptions, ReferenceOptions,
};
use approbation::config::Config;
use approbation::output::OutputFormat;
use approbation::{CommandOutput, NoFilesMatched, logging};
use approbation_core::DEFAULT_MINIMUM_CRITERIA;
use eyre::Result;
use figue as args;
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// CLI arguments
#[derive(Debug, facet::Facet)]
struct Args {
    /// Subcommand to run
    #[facet(args::subcommand)]
    command: Option<Command>,

    /// Path to config file (default: .config/approbation/config.styx)
    #[facet(args::named, args::short = 'c', default)]
    config: Option<PathBuf>,
}

/// Subcommands
#[derive(Debug, facet::Facet)]
#[repr(u8)]
enum Command {
    /// Check that every spec's AC codes are well formed anchors
    CheckCodes {
        /// Glob matching spec files
        #[facet(args::named, default)]
        specs: Option<String>,

        /// Glob of files to leave out
        #[facet(args::named, default)]
        ignore: Option<String>,

        /// Minimum ACs for a spec to be acceptable (default: 1)
        #[facet(args::named, default)]
        minimum: Option<usize>,

        #[facet(args::named, args::short = 'v', default)]
        verbose: bool,
    },

    /// Check that spec filenames follow NNNN-XXXX-descriptive_name.md
    CheckFilenames {
        /// Glob matching spec files
        #[facet(args::named, default)]
        specs: Option<String>,

        /// Glob of files to leave out
        #[facet(args::named, default)]
        ignore: Option<String>,

        #[facet(args::named, args::short = 'v', default)]
        verbose: bool,
    },

    /// Cross-reference spec ACs with tests and report coverage
    CheckReferences {
        /// Glob matching spec files
        #[facet(args::named, default)]
        specs: Option<String>,

        /// Glob matching test files
        #[facet(args::named, default)]
        tests: Option<String>,

        /// Glob of files to leave out of both lists
        #[facet(args::named, default)]
        ignore: Option<String>,

        /// Categories JSON file
        #[facet(args::named, default)]
        categories: Option<String>,

        /// Features JSON file
        #[facet(args::named, default)]
        features: Option<String>,

        /// List ACs referenced in tests but not declared by any spec
        #[facet(args::named, default)]
        mystery: bool,

        #[facet(args::named, args::short = 'v', default)]
        verbose: bool,

        /// Print the per-category table instead of the totals
        #[facet(args::named, default)]
        category_stats: bool,

        /// Print a line per spec file
        #[facet(args::named, default)]
        show_files: bool,

        /// Print the per-spec table
        #[facet(args::named, default)]
        file_stats: bool,

        /// Write approbation-categories.csv and approbation-files.csv
        #[facet(args::named, default)]
        csv: bool,

        /// Write jenkins.txt, a one-line CI summary
        #[facet(args::named, default)]
        jenkins: bool,

        /// Milestone reported in the CI summary (default: the last one)
        #[facet(args::named, default)]
        current_milestone: Option<String>,

        /// Directory for CSV and CI summary files (default: ./results)
        #[facet(args::named, args::short = 'o', default)]
        output: Option<PathBuf>,

        /// Output format: text, json
        #[facet(args::named, args::short = 'f', default)]
        format: Option<String>,

        /// Print the git branch of every project checked out here
        #[facet(args::named, default)]
        show_branches: bool,

        /// Exit 1 when any mystery AC is found
        #[facet(args::named, default)]
        fail_on_mystery: bool,
    },

    /// Check a features JSON file against the specs
    CheckFeatures {
        /// Glob matching spec files
        #[facet(args::named, default)]
        specs: Option<String>,

        /// Features JSON file
        #[facet(args::named, default)]
        features: Option<String>,

        /// Glob of files to leave out
        #[facet(args::named, default)]
        ignore: Option<String>,

        #[facet(args::named, args::short = 'v', default)]
        verbose: bool,
    },

    /// Suggest the next AC code for a single spec
    NextCode {
        /// Glob matching exactly one spec file
        #[facet(args::named, default)]
        specs: Option<String>,

        /// Glob of files to leave out
        #[facet(args::named, default)]
        ignore: Option<String>,

        #[facet(args::named, args::short = 'v', default)]
        verbose: bool,
    },

    /// Suggest the next spec sequence number
    NextFilename {
        /// Glob matching spec files
        #[facet(args::named, default)]
        specs: Option<String>,

        /// Glob of files to leave out
        #[facet(args::named, default)]
        ignore: Option<String>,

        #[facet(args::named, args::short = 'v', default)]
        verbose: bool,
    },
}

impl Command {
    fn verbose(&self) -> bool {
        match self {
            Command::CheckCodes { verbose, .. }
            | Command::CheckFilenames { verbose, .. }
            | Command::CheckReferences { verbose, .. }
            | Command::CheckFeatures { verbose, .. }
            | Command::NextCode { verbose, .. }
            | Command::NextFilename { verbose, .. } => *verbose,
        }
    }
}

fn main() {
    let args: Args = match figue::from_std_args().into_result().map(|output| output.get()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let Some(command) = args.command else {
        eprintln!(
            "Usage: approbation <check-codes|check-filenames|check-references|check-features|next-code|next-filename> [options]"
        );
        std::process::exit(2);
    };

    logging::init(command.verbose());

    match run(command, args.config) {
        Ok(output) => {
            print!("{}", output.text);
            std::process::exit(output.status.exit_code());
        }
        Err(e) => {
            if let Some(no_files) = e.downcast_ref::<NoFilesMatched>() {
                eprintln!("{}", no_files.to_string().red());
            } else {
                eprintln!("{} {:?}", "Error:".red().bold(), e);
            }
            std::process::exit(1);
        }
    }
}

fn run(command: Command, config_path: Option<PathBuf>) -> Result<CommandOutput> {
    let config = Config::discover(config_path.as_deref())?;

    match command {
        Command::CheckCodes {
            specs,
            ignore,
            minimum,
            verbose,
        } => commands::check_codes::run(&CheckCodesOptions {
            specs: Config::require("specs", specs, &config.specs)?,
            ignore: Config::pick(ignore, &config.ignore),
            minimum: minimum
                .or(config.minimum_criteria)
                .unwrap_or(DEFAULT_MINIMUM_CRITERIA),
            verbose,
        }),
        Command::CheckFilenames {
            specs,
            ignore,
            verbose,
        } => commands::check_filenames::run(&CheckFilenamesOptions {
            specs: Config::require("specs", specs, &config.specs)?,
            ignore: Config::pick(ignore, &config.ignore),
            verbose,
        }),
        Command::CheckReferences {
            specs,
            tests,
            ignore,
            categories,
            features,
            mystery,
            verbose,
            category_stats,
            show_files,
            file_stats,
            csv,
            jenkins,
            current_milestone,
            output,
            format,
            show_branches,
            fail_on_mystery,
        } => {
            let format = match format {
                Some(name) => OutputFormat::from_str(&name)
                    .ok_or_else(|| eyre::eyre!("Unknown format '{}' (expected text or json)", name))?,
                None => OutputFormat::Text,
            };
            let output = config.output_dir(output);
            commands::check_references::run(&ReferenceOptions {
                specs: Config::require("specs", specs, &config.specs)?,
                tests: Config::require("tests", tests, &config.tests)?,
                ignore: Config::pick(ignore, &config.ignore),
                categories: Config::pick(categories, &config.categories).map(PathBuf::from),
                features: Config::pick(features, &config.features).map(PathBuf::from),
                mystery,
                verbose,
                category_stats,
                show_files,
                file_stats,
                csv,
                jenkins,
                current_milestone: Config::pick(current_milestone, &config.current_milestone),
                output,
                format,
                show_branches,
                fail_on_mystery,
            })
        }
        Command::CheckFeatures {
            specs,
            features,
            ignore,
            verbose,
        } => commands::check_features::run(&CheckFeaturesOptions {
            specs: Config::require("specs", specs, &config.specs)?,
            features: PathBuf::from(Config::require("features", features, &config.features)?),
            ignore: Config::pick(ignore, &config.ignore),
            verbose,
        }),
        Command::NextCode {
            specs,
            ignore,
            verbose,
        } => commands::next_code::run(&NextCodeOptions {
            specs: Config::require("specs", specs, &config.specs)?,
            ignore: Config::pick(ignore, &config.ignore),
            verbose,
        }),
        Command::NextFilename {
            specs,
            ignore,
            verbose,
        } => commands::next_filename::run(&NextFilenameOptions {
            specs: Config::require("specs", specs, &config.specs)?,
            ignore: Config::pick(ignore, &config.ignore),
            verbose,
        }),
    }
}
