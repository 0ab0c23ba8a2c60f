//! Decision providers for autonomous participants.
//!
//! This module provides:
//! - the [`DecisionProvider`] trait
//! - RandomProvider: uniformly random valid choices (seedable)
//! - ScriptedProvider: queued answers for tests and simulations
//! - LlmProvider: chat-completions backed, with its own circuit breaker

pub mod llm;
pub mod prompts;
mod random;
pub mod registry;
mod scripted;
pub mod speech;
mod trait_def;

use std::sync::Arc;

pub use llm::{CircuitBreaker, LlmProvider};
pub use random::RandomProvider;
pub use scripted::ScriptedProvider;
pub use trait_def::{AiError, DecisionProvider};
use tracing::warn;

use crate::config::DecisionBackend;

/// Builds the provider selected by configuration.
///
/// An LLM backend that cannot be constructed degrades to random decisions.
pub fn provider_for(backend: &DecisionBackend, seed: Option<u64>) -> Arc<dyn DecisionProvider> {
    match backend {
        DecisionBackend::Random => Arc::new(RandomProvider::new(seed)),
        DecisionBackend::Llm(config) => match LlmProvider::new(config.clone()) {
            Ok(provider) => Arc::new(provider),
            Err(err) => {
                warn!(error = %err, "LLM provider unavailable, using random decisions");
                Arc::new(RandomProvider::new(seed))
            }
        },
    }
}
