use std::sync::Arc;

use super::session_registry::SessionRegistry;
use crate::config::{DecisionBackend, GameConfig};
use crate::error::AppError;

/// Application state shared by every request and connection.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Settings every new session starts from
    pub config: GameConfig,
    /// Decision provider handed to autonomous participants
    pub backend: DecisionBackend,
    /// Live sessions, keyed by session id
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: GameConfig, backend: DecisionBackend) -> Self {
        Self {
            config,
            backend,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }

    /// Reads game and provider settings from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(GameConfig::from_env()?, DecisionBackend::from_env()?))
    }

    /// Default game settings, random decisions, no pacing.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        let config = GameConfig {
            timings: crate::config::SessionTimings::instant(),
            ..GameConfig::default()
        };
        Self::new(config, DecisionBackend::Random)
    }
}
