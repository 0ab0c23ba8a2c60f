//! Session controller - drives one session through its phases.
//!
//! The controller owns the game state and advances it step by step. Whenever
//! the human participant has to act it records a [`Suspension`] and returns;
//! the next matching [`Command`](crate::protocol::Command) resumes it. Steps
//! that only involve autonomous participants run back to back, paced by the
//! configured pauses.

mod ai_coordinator;
mod day;
mod orchestration;
mod player_actions;
mod retaliation;
mod round_lifecycle;
mod voting;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::prelude::*;
use tracing::{debug, warn};
use uuid::Uuid;

use super::round_orchestrator::RoundOrchestrator;
use crate::ai::{DecisionProvider, RandomProvider};
use crate::config::GameConfig;
use crate::domain::{DomainError, GameState, ParticipantId, Role, VisibleState};
use crate::protocol::{EventSink, GameEvent};

/// What the controller is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspension {
    /// Mid-step; no command is accepted.
    Running,
    AwaitingStart,
    AwaitingRoleConfirm,
    AwaitingEliminatorTarget { actor: ParticipantId },
    AwaitingInvestigatorTarget { actor: ParticipantId },
    AwaitingProtectorDecision { actor: ParticipantId },
    AwaitingSpeech { speaker: ParticipantId },
    AwaitingBeginVoting,
    AwaitingVote { voter: ParticipantId },
    AwaitingFinalStatement { participant: ParticipantId },
    AwaitingRetaliationTarget { retaliator: ParticipantId },
    AwaitingEnterNight,
    Finished,
}

impl Suspension {
    pub fn is_waiting_on_human(self) -> bool {
        !matches!(self, Suspension::Running | Suspension::Finished)
    }
}

/// Internal continuation points of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    EnterNight,
    EliminatorTurn,
    InvestigatorTurn,
    ProtectorTurn,
    Dawn,
    NextStatement,
    StartDiscussion,
    Speak,
    DiscussionEnd,
    Vote,
    ResolveVote,
    Retaliation,
    AwaitEnterNight,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Next(Step),
    Suspend(Suspension),
}

pub struct SessionController {
    state: GameState,
    orchestrator: RoundOrchestrator,
    provider: Arc<dyn DecisionProvider>,
    sink: Arc<dyn EventSink>,
    config: GameConfig,
    rng: StdRng,
    role_deck: Option<Vec<Role>>,
    suspension: Suspension,
    active: bool,
    /// Participants still owed a final statement, in order.
    statements: VecDeque<ParticipantId>,
    /// Where the flow continues once `statements` drains.
    after_statements: Step,
}

/// Builder for [`SessionController`].
pub struct SessionBuilder {
    human_name: String,
    session_id: Option<Uuid>,
    config: GameConfig,
    seed: Option<u64>,
    human_seat: Option<ParticipantId>,
    role_deck: Option<Vec<Role>>,
    provider: Option<Arc<dyn DecisionProvider>>,
    sink: Option<Arc<dyn EventSink>>,
}

impl SessionBuilder {
    pub fn session_id(mut self, id: Uuid) -> Self {
        self.session_id = Some(id);
        self
    }

    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Seeds seat selection, role shuffling and every random fallback.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn human_seat(mut self, seat: ParticipantId) -> Self {
        self.human_seat = Some(seat);
        self
    }

    /// Deals exactly this deck, seat 1 first, instead of shuffling.
    pub fn role_deck(mut self, deck: Vec<Role>) -> Self {
        self.role_deck = Some(deck);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn DecisionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<SessionController, DomainError> {
        let config = self.config;
        config.role_counts.validate(config.player_count)?;

        if let Some(deck) = &self.role_deck {
            if deck.len() != usize::from(config.player_count) {
                return Err(DomainError::DeckMismatch {
                    deck: deck.len(),
                    participants: usize::from(config.player_count),
                });
            }
        }

        let sink = self
            .sink
            .ok_or_else(|| DomainError::Validation("a session needs an event sink".into()))?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let human_seat = match self.human_seat {
            Some(seat) => seat,
            None => rng.random_range(1..=config.player_count),
        };

        let session_id = self.session_id.unwrap_or_else(Uuid::new_v4);
        let state = GameState::new(session_id, config.player_count, human_seat, &self.human_name)?;
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(RandomProvider::new(self.seed)));

        Ok(SessionController {
            state,
            orchestrator: RoundOrchestrator::new(config.role_counts),
            provider,
            sink,
            config,
            rng,
            role_deck: self.role_deck,
            suspension: Suspension::Running,
            active: true,
            statements: VecDeque::new(),
            after_statements: Step::StartDiscussion,
        })
    }
}

impl SessionController {
    pub fn builder(human_name: impl Into<String>) -> SessionBuilder {
        SessionBuilder {
            human_name: human_name.into(),
            session_id: None,
            config: GameConfig::default(),
            seed: None,
            human_seat: None,
            role_deck: None,
            provider: None,
            sink: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.state.session_id
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn suspension(&self) -> Suspension {
        self.suspension
    }

    /// False once the event sink has failed; the session stops producing output.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_finished(&self) -> bool {
        self.suspension == Suspension::Finished
    }

    /// How long the current suspension may last before [`Self::on_deadline`] applies.
    pub fn deadline(&self) -> Option<Duration> {
        match self.suspension {
            Suspension::AwaitingFinalStatement { .. } => Some(self.config.timings.statement_timeout),
            _ => None,
        }
    }

    pub(crate) async fn emit(&mut self, event: GameEvent) {
        if !self.active {
            return;
        }
        if let Err(err) = self.sink.deliver(&event).await {
            warn!(
                session_id = %self.state.session_id,
                event = event.kind(),
                error = %err,
                "Event sink failed, deactivating session"
            );
            self.active = false;
        }
    }

    pub(crate) async fn announce(&mut self, message: impl Into<String>) {
        self.emit(GameEvent::announce(message)).await;
    }

    pub(crate) async fn pause(&self, duration: Duration) {
        if self.active && !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    pub(crate) async fn short_pause(&self) {
        self.pause(self.config.timings.short_pause).await;
    }

    pub(crate) async fn long_pause(&self) {
        self.pause(self.config.timings.long_pause).await;
    }

    pub(crate) fn view_of(&self, id: ParticipantId) -> Option<VisibleState> {
        VisibleState::for_participant(&self.state, id)
    }

    pub(crate) fn human_alive(&self) -> bool {
        self.state.is_alive(self.state.human_id())
    }

    pub(crate) fn random_choice(&mut self, options: &[ParticipantId]) -> Option<ParticipantId> {
        let choice = options.choose(&mut self.rng).copied();
        debug!(session_id = %self.state.session_id, ?choice, "Random fallback choice");
        choice
    }
}
