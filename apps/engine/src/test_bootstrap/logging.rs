#![cfg(test)]

//! Unified test logging initialization.
//!
//! Single source of truth for test logging. Uses a one-time guard to
//! prevent double initialization and integrates with cargo's output
//! capture. Level precedence: `TEST_LOG`, then `RUST_LOG`, then `warn`.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize structured logging for tests. Idempotent and race-safe.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
