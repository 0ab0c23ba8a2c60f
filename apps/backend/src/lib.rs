#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod ai;
pub mod config;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod protocol;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod ws;

// Re-exports for public API
pub use error::AppError;
pub use middleware::cors::cors_middleware;
pub use middleware::request_log::RequestLog;
pub use services::{spawn_session, SessionBuilder, SessionController, SessionHandle, Suspension};
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    nightfall_test_support::logging::init();
}
