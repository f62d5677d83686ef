//! Logging setup.
//!
//! All log output goes through `tracing`. Lines follow the
//! `YYYY-MM-DD HH:MM:SS LEVEL target: message` format.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Timestamp format used by the fmt layer.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Builds the env filter from `RUST_LOG`, falling back to `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Installs the global subscriber.
///
/// Fails if a global subscriber is already set, which callers embedding the
/// crate in a larger compositor may treat as harmless.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

/// Test-friendly variant: writes through the test harness capture and
/// ignores an already-installed subscriber.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("kiosk_layers=debug"))
        .with_test_writer()
        .try_init();
}
