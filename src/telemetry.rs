//! Structured log output.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber writing compact lines to stdout.
///
/// Directives in `RUST_LOG` take precedence; otherwise `default_filter` is
/// used. Returns `false` when a subscriber was already installed, which
/// leaves that subscriber in place.
#[must_use = "a `false` result means another subscriber is active"]
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .is_ok()
}
