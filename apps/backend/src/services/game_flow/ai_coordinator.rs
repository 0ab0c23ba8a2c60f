use std::fmt::Debug;
use std::sync::Arc;

use futures::future::BoxFuture;
use rand::prelude::*;
use tracing::{debug, warn};

use super::SessionController;
use crate::ai::speech::canned_speech;
use crate::ai::{AiError, DecisionProvider};
use crate::domain::{ParticipantId, Role};

/// Asks the provider up to `attempts` times and returns the first acceptable answer.
///
/// An unavailable provider is not called; one that reports `Unavailable` is not asked again.
pub(super) async fn with_retries<'a, T, F, A>(
    provider: &dyn DecisionProvider,
    attempts: u32,
    decision: &'static str,
    mut call: F,
    accept: A,
) -> Option<T>
where
    T: Debug,
    F: FnMut() -> BoxFuture<'a, Result<T, AiError>>,
    A: Fn(&T) -> bool,
{
    for attempt in 1..=attempts.max(1) {
        if !provider.is_available() {
            debug!(provider = provider.name(), decision, attempt, "Provider unavailable, skipping");
            return None;
        }
        match call().await {
            Ok(answer) if accept(&answer) => return Some(answer),
            Err(AiError::Unavailable) => {
                debug!(provider = provider.name(), decision, attempt, "Provider became unavailable");
                return None;
            }
            Ok(answer) => warn!(
                provider = provider.name(),
                decision,
                attempt,
                ?answer,
                "Decision outside the valid set"
            ),
            Err(err) => warn!(
                provider = provider.name(),
                decision,
                attempt,
                error = %err,
                "Decision failed"
            ),
        }
    }
    None
}

impl SessionController {
    /// Target for a night action or a retaliation shot, falling back to a uniformly
    /// random valid target.
    pub(super) async fn decide_target(
        &mut self,
        role: Role,
        actor: ParticipantId,
        valid: &[ParticipantId],
    ) -> Option<ParticipantId> {
        if valid.is_empty() {
            return None;
        }
        let provider = Arc::clone(&self.provider);
        let attempts = self.config.decision_attempts();
        let answer = match self.view_of(actor) {
            Some(view) => {
                with_retries(
                    provider.as_ref(),
                    attempts,
                    "night_target",
                    || provider.produce_night_target(role, &view, valid),
                    |target| valid.contains(target),
                )
                .await
            }
            None => None,
        };
        match answer {
            Some(target) => Some(target),
            None => self.random_choice(valid),
        }
    }

    pub(super) async fn decide_speech(&mut self, speaker: ParticipantId) -> String {
        let provider = Arc::clone(&self.provider);
        let attempts = self.config.decision_attempts();
        let answer = match self.view_of(speaker) {
            Some(view) => {
                with_retries(
                    provider.as_ref(),
                    attempts,
                    "speech",
                    || provider.produce_speech(&view),
                    |text: &String| !text.trim().is_empty(),
                )
                .await
            }
            None => None,
        };
        answer.unwrap_or_else(|| canned_speech(&mut self.rng).to_string())
    }

    /// Falls back to a coin flip.
    pub(super) async fn decide_protect(&mut self, actor: ParticipantId) -> bool {
        let provider = Arc::clone(&self.provider);
        let attempts = self.config.decision_attempts();
        let answer = match self.view_of(actor) {
            Some(view) => {
                with_retries(
                    provider.as_ref(),
                    attempts,
                    "protect",
                    || provider.produce_protect_decision(&view),
                    |_| true,
                )
                .await
            }
            None => None,
        };
        answer.unwrap_or_else(|| self.rng.random_bool(0.5))
    }

    /// Falls back to keeping the poison.
    pub(super) async fn decide_poison(
        &mut self,
        actor: ParticipantId,
        valid: &[ParticipantId],
    ) -> Option<ParticipantId> {
        let provider = Arc::clone(&self.provider);
        let attempts = self.config.decision_attempts();
        let view = self.view_of(actor)?;
        with_retries(
            provider.as_ref(),
            attempts,
            "poison",
            || provider.produce_poison_decision(&view, valid),
            |choice| choice.map_or(true, |target| valid.contains(&target)),
        )
        .await
        .flatten()
    }
}
