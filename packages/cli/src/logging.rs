// ABOUTME: Tracing subscriber setup for the CLI
// ABOUTME: RUST_LOG wins; otherwise info, or debug with --verbose

use strava_auth_config::constants;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so stdout stays scriptable.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(constants::RUST_LOG)
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false) // Don't show module paths in logs
        .compact()
        .init();
}
