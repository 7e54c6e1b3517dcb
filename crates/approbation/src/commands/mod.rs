//! One module per subcommand

pub mod check_codes;
pub mod check_features;
pub mod check_filenames;
pub mod check_references;
pub mod next_code;
pub mod next_filename;

pub use check_codes::CheckCodesOptions;
pub use check_features::CheckFeaturesOptions;
pub use check_filenames::CheckFilenamesOptions;
pub use check_references::ReferenceOptions;
pub use next_code::NextCodeOptions;
pub use next_filename::NextFilenameOptions;
