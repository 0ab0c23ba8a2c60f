//! Scripted provider - replays queued answers.
//!
//! Used by tests and the simulator to force specific lines of play. Empty
//! queues answer `AiError::Unavailable` for speeches, votes and targets, and
//! "do nothing" for the protector's optional actions.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::trait_def::{AiError, DecisionProvider};
use crate::domain::{ParticipantId, Role, VisibleState};

#[derive(Default)]
pub struct ScriptedProvider {
    speeches: Mutex<VecDeque<String>>,
    votes: Mutex<HashMap<ParticipantId, VecDeque<ParticipantId>>>,
    night_targets: Mutex<HashMap<Role, VecDeque<ParticipantId>>>,
    protect: Mutex<VecDeque<bool>>,
    poison: Mutex<VecDeque<Option<ParticipantId>>>,
    stall_votes: bool,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub const NAME: &'static str = "scripted";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn speech(self, text: impl Into<String>) -> Self {
        self.speeches.lock().push_back(text.into());
        self
    }

    /// Queues ballots for one voter, one per vote phase.
    pub fn votes_for(self, voter: ParticipantId, targets: impl IntoIterator<Item = ParticipantId>) -> Self {
        self.votes.lock().entry(voter).or_default().extend(targets);
        self
    }

    /// Queues night targets for a role, one per night (or per shot for the Retaliator).
    pub fn night_targets(self, role: Role, targets: impl IntoIterator<Item = ParticipantId>) -> Self {
        self.night_targets.lock().entry(role).or_default().extend(targets);
        self
    }

    pub fn protect(self, decisions: impl IntoIterator<Item = bool>) -> Self {
        self.protect.lock().extend(decisions);
        self
    }

    pub fn poison(self, decisions: impl IntoIterator<Item = Option<ParticipantId>>) -> Self {
        self.poison.lock().extend(decisions);
        self
    }

    /// Vote requests never complete, so the collective timeout has to fire.
    pub fn stalling_votes(mut self) -> Self {
        self.stall_votes = true;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Total number of produce_* calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DecisionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    async fn produce_speech(&self, _view: &VisibleState) -> Result<String, AiError> {
        self.count_call();
        self.speeches.lock().pop_front().ok_or(AiError::Unavailable)
    }

    async fn produce_vote(
        &self,
        view: &VisibleState,
        _valid: &[ParticipantId],
    ) -> Result<ParticipantId, AiError> {
        self.count_call();
        if self.stall_votes {
            return std::future::pending().await;
        }
        let next = self
            .votes
            .lock()
            .get_mut(&view.viewer_id)
            .and_then(VecDeque::pop_front);
        next.ok_or(AiError::Unavailable)
    }

    async fn produce_night_target(
        &self,
        role: Role,
        _view: &VisibleState,
        _valid: &[ParticipantId],
    ) -> Result<ParticipantId, AiError> {
        self.count_call();
        let next = self
            .night_targets
            .lock()
            .get_mut(&role)
            .and_then(VecDeque::pop_front);
        next.ok_or(AiError::Unavailable)
    }

    async fn produce_protect_decision(&self, _view: &VisibleState) -> Result<bool, AiError> {
        self.count_call();
        Ok(self.protect.lock().pop_front().unwrap_or(false))
    }

    async fn produce_poison_decision(
        &self,
        _view: &VisibleState,
        _valid: &[ParticipantId],
    ) -> Result<Option<ParticipantId>, AiError> {
        self.count_call();
        Ok(self.poison.lock().pop_front().flatten())
    }
}
