//! Shared test utilities for the session engine.
//!
//! Logging is installed once per test binary; property tests share one
//! configuration so case counts can be tuned from the environment.

pub mod logging;
pub mod props;
