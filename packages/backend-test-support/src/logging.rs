//! One-shot tracing setup for unit and integration test binaries.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Install a test-friendly subscriber. Safe to call from every `ctor` hook.
///
/// Filter precedence: `TEST_LOG`, then `RUST_LOG`, then `warn`.
/// Output goes through the libtest writer so it is captured per test.
pub fn init() {
    INSTALLED.get_or_init(|| {
        let directives = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());

        fmt()
            .with_env_filter(EnvFilter::new(directives))
            .with_test_writer()
            .without_time()
            .with_target(true)
            .try_init()
            .ok();
    });
}
