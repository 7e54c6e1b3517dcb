//! approbation - Check acceptance criteria coverage across a spec corpus
//!
//! The binary is a thin layer over [`commands`]: every subcommand takes an
//! options struct, does its work through `approbation-core`, and returns a
//! [`CommandOutput`] holding the rendered report and whether the check
//! passed. Files the commands write (CSV, CI summary) go to the output
//! directory given in the options.

pub mod branches;
pub mod commands;
pub mod config;
pub mod files;
pub mod logging;
pub mod output;

pub use files::NoFilesMatched;

/// Whether a command's checks passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
}

impl Status {
    pub fn from_ok(ok: bool) -> Self {
        if ok { Status::Passed } else { Status::Failed }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Status::Passed => 0,
            Status::Failed => 1,
        }
    }
}

/// What a command produced: the report to print and its status
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: Status,
    pub text: String,
}

impl CommandOutput {
    pub fn new(status: Status, text: String) -> Self {
        Self { status, text }
    }
}
