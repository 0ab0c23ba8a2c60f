//! Shared proptest configuration.
//!
//! Env knobs:
//! - `PROPTEST_CASES`: cases per property (defaults to a small number for fast CI).
//! - `PROPTEST_MAX_SHRINK_MS`: optional cap on shrinking time.

use proptest::prelude::ProptestConfig;

const DEFAULT_CASES: u32 = 16;

pub fn config() -> ProptestConfig {
    let base = ProptestConfig::default();

    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_CASES)
        .max(1);

    let max_shrink_time = std::env::var("PROPTEST_MAX_SHRINK_MS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(base.max_shrink_time);

    ProptestConfig {
        // No regression files for in-tree property tests
        failure_persistence: None,
        cases,
        max_shrink_time,
        ..base
    }
}
