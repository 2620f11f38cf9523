//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Initialize structured logging once at startup.
///
/// `RUST_LOG` takes precedence when set; otherwise the `--debug` flag selects
/// between `info` and `debug` as the default level.
pub fn setup_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
