//! Diagnostic logging to stderr

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `APPROBATION_LOG=debug`
pub const LOG_ENV: &str = "APPROBATION_LOG";

/// Install the global subscriber. The filter comes from [`LOG_ENV`] when set,
/// otherwise `warn` (`info` with `--verbose`). Calling this twice is a no-op.
pub fn init(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
