//! Random provider - uniformly random valid choices.
//!
//! Baseline for tests and the simulator, and the shape every other provider
//! follows: choose only from the valid set handed in, never panic, support
//! seeding for reproducible runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::prelude::*;

use super::speech::canned_speech;
use super::trait_def::{AiError, DecisionProvider};
use crate::domain::{ParticipantId, Role, VisibleState};

/// Chance of spending the protection charge when a save is possible.
const SAVE_PROBABILITY: f64 = 0.5;
/// Chance of spending the poison on any given night.
const POISON_PROBABILITY: f64 = 0.2;

pub struct RandomProvider {
    rng: Mutex<StdRng>,
}

impl RandomProvider {
    pub const NAME: &'static str = "random";
    pub const VERSION: &'static str = "1.0.0";

    /// `Some(seed)` for reproducible runs, `None` for OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn pick(&self, valid: &[ParticipantId]) -> Result<ParticipantId, AiError> {
        valid
            .choose(&mut *self.rng.lock())
            .copied()
            .ok_or_else(|| AiError::InvalidMove("no valid targets".into()))
    }
}

#[async_trait]
impl DecisionProvider for RandomProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn produce_speech(&self, _view: &VisibleState) -> Result<String, AiError> {
        Ok(canned_speech(&mut *self.rng.lock()).to_string())
    }

    async fn produce_vote(
        &self,
        _view: &VisibleState,
        valid: &[ParticipantId],
    ) -> Result<ParticipantId, AiError> {
        self.pick(valid)
    }

    async fn produce_night_target(
        &self,
        role: Role,
        view: &VisibleState,
        valid: &[ParticipantId],
    ) -> Result<ParticipantId, AiError> {
        // Eliminators avoid their own faction when they can.
        if role == Role::Eliminator {
            let outsiders: Vec<ParticipantId> = valid
                .iter()
                .copied()
                .filter(|id| *id != view.viewer_id && !view.teammates.contains(id))
                .collect();
            if !outsiders.is_empty() {
                return self.pick(&outsiders);
            }
        }
        self.pick(valid)
    }

    async fn produce_protect_decision(&self, view: &VisibleState) -> Result<bool, AiError> {
        if view.eliminator_target.is_none() || view.protect_charges == 0 {
            return Ok(false);
        }
        Ok(self.rng.lock().random_bool(SAVE_PROBABILITY))
    }

    async fn produce_poison_decision(
        &self,
        view: &VisibleState,
        valid: &[ParticipantId],
    ) -> Result<Option<ParticipantId>, AiError> {
        if view.poison_charges == 0 || valid.is_empty() {
            return Ok(None);
        }
        let mut rng = self.rng.lock();
        if !rng.random_bool(POISON_PROBABILITY) {
            return Ok(None);
        }
        Ok(valid.choose(&mut *rng).copied())
    }
}
