//! Diagnostic logging for the CLI.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! application's job. The filter comes from `QHIST_LOG` (same syntax as
//! `RUST_LOG`) and defaults to warnings only. Output goes to stderr so that
//! command output on stdout stays machine-readable.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Env var holding the log filter directive.
pub const LOG_ENV: &str = "QHIST_LOG";

const DEFAULT_FILTER: &str = "qhist=warn";

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("qhist=debug");
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. `verbose` forces debug level.
///
/// Call once, from `main`, before any store operation.
pub fn init(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
