//! Logging infrastructure for fitsched.
//!
//! Provides centralized tracing setup for embedding binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with sensible defaults
///
/// Environment-based filtering (RUST_LOG) over a compact format.
/// Default level is INFO.
pub fn init() {
    init_with_level("info")
}

/// Initialize logging with a specific default level
///
/// The level can still be overridden by the RUST_LOG environment variable.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
