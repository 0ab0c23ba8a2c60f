//! Environment-driven configuration.

pub mod game;
pub mod llm;
pub mod server;

pub use game::{GameConfig, Pacing, SessionTimings};
pub use llm::{DecisionBackend, LlmConfig};
pub use server::ServerConfig;
