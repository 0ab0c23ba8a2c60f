//! Decision provider trait definition.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{ParticipantId, Role, VisibleState};

/// Errors a provider may report. None of these ever reach the player; the
/// controller retries and then falls back to a random valid choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// No answer within the provider's own deadline
    Timeout,
    /// Provider cannot answer right now (open circuit, exhausted script)
    Unavailable,
    /// Transport or parsing failure inside the provider
    Internal(String),
    /// Answer was produced but is not one of the valid choices
    InvalidMove(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Timeout => write!(f, "decision timeout"),
            AiError::Unavailable => write!(f, "decision provider unavailable"),
            AiError::Internal(msg) => write!(f, "decision provider error: {msg}"),
            AiError::InvalidMove(msg) => write!(f, "invalid decision: {msg}"),
        }
    }
}

impl std::error::Error for AiError {}

/// Produces choices for autonomous participants.
///
/// Every call receives the [`VisibleState`] of the participant being asked
/// and, where applicable, the exact set of valid targets. Implementations
/// must only return values from that set; anything else is treated as a
/// failed attempt.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Capability query. When false the controller skips the provider
    /// entirely and uses its fallback.
    fn is_available(&self) -> bool {
        true
    }

    async fn produce_speech(&self, view: &VisibleState) -> Result<String, AiError>;

    async fn produce_vote(
        &self,
        view: &VisibleState,
        valid: &[ParticipantId],
    ) -> Result<ParticipantId, AiError>;

    /// Night target for the eliminators or the investigator; also used for
    /// the Retaliator's shot.
    async fn produce_night_target(
        &self,
        role: Role,
        view: &VisibleState,
        valid: &[ParticipantId],
    ) -> Result<ParticipantId, AiError>;

    /// Whether to spend the protection charge on tonight's target.
    async fn produce_protect_decision(&self, view: &VisibleState) -> Result<bool, AiError>;

    /// `None` keeps the poison for later.
    async fn produce_poison_decision(
        &self,
        view: &VisibleState,
        valid: &[ParticipantId],
    ) -> Result<Option<ParticipantId>, AiError>;
}
