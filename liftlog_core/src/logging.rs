//! Logging infrastructure for liftlog.
//!
//! Output goes to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging at `warn`, or `debug` when `verbose` is set.
///
/// RUST_LOG still takes precedence over either default.
pub fn init(verbose: bool) {
    init_with_level(if verbose { "debug" } else { "warn" })
}

/// Initialize logging with a specific default level
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init: a second call (tests, embedding apps) is a no-op instead of a panic
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
