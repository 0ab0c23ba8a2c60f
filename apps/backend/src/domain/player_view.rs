//! What one participant is allowed to see.
//!
//! [`VisibleState`] is the only input handed to decision providers. It never
//! carries another participant's role unless the viewer is hostile and the
//! other participant is a teammate.

use serde::{Deserialize, Serialize};

use crate::domain::participant::{Participant, ParticipantId, Role};
use crate::domain::state::{GameState, InvestigationRecord, Phase, SpeechRecord};

/// Public face of a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicParticipant {
    pub id: ParticipantId,
    pub name: String,
    pub alive: bool,
    pub is_human: bool,
}

impl From<&Participant> for PublicParticipant {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            alive: p.is_alive(),
            is_human: p.is_human,
        }
    }
}

pub fn public_roster(state: &GameState) -> Vec<PublicParticipant> {
    state.participants().iter().map(PublicParticipant::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleState {
    pub viewer_id: ParticipantId,
    pub viewer_name: String,
    pub role: Option<Role>,
    pub alive: bool,
    pub round: u32,
    pub phase: Phase,
    pub participants: Vec<PublicParticipant>,
    /// Other hostile participants; empty for good viewers.
    pub teammates: Vec<ParticipantId>,
    pub speeches: Vec<SpeechRecord>,
    /// Viewer's own investigation history.
    pub investigations: Vec<InvestigationRecord>,
    /// Protector only: tonight's eliminator target.
    pub eliminator_target: Option<ParticipantId>,
    pub protect_charges: u8,
    pub poison_charges: u8,
}

impl VisibleState {
    pub fn for_participant(state: &GameState, viewer_id: ParticipantId) -> Option<Self> {
        let viewer = state.participant(viewer_id)?;
        let role = viewer.role();

        let teammates = if viewer.is_hostile() {
            state
                .hostile_ids()
                .into_iter()
                .filter(|id| *id != viewer_id)
                .collect()
        } else {
            Vec::new()
        };

        let investigations = state
            .investigations()
            .iter()
            .filter(|r| r.investigator_id == viewer_id)
            .cloned()
            .collect();

        let is_protector = role == Some(Role::Protector);
        let eliminator_target = if is_protector {
            state.night_action().and_then(|r| r.eliminator_target)
        } else {
            None
        };
        let (protect_charges, poison_charges) = if is_protector {
            (state.charges.protect, state.charges.poison)
        } else {
            (0, 0)
        };

        Some(Self {
            viewer_id,
            viewer_name: viewer.name.clone(),
            role,
            alive: viewer.is_alive(),
            round: state.round(),
            phase: state.phase,
            participants: public_roster(state),
            teammates,
            speeches: state.speeches().to_vec(),
            investigations,
            eliminator_target,
            protect_charges,
            poison_charges,
        })
    }

    pub fn alive_ids(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|p| p.alive)
            .map(|p| p.id)
            .collect()
    }

    pub fn name_of(&self, id: ParticipantId) -> Option<&str> {
        self.participants
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }

    /// Speeches from the current round only.
    pub fn speeches_this_round(&self) -> impl Iterator<Item = &SpeechRecord> {
        let round = self.round;
        self.speeches.iter().filter(move |s| s.round == round)
    }
}
