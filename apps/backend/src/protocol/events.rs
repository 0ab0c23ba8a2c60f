//! Outbound notifications.
//!
//! Every event is serialized as `{"type": "...", "data": {...}}`.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    DeathRecord, GameResult, ParticipantId, Phase, PublicParticipant, Role, SpeechRecord, Status,
};

/// Identifies which inbound command a prompt is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ConfirmRole,
    EliminatorTarget,
    InvestigatorTarget,
    ProtectorAction,
    Speak,
    FinalStatement,
    BeginVoting,
    Vote,
    RetaliationTarget,
    EnterNight,
    /// Nothing to do until the others finish.
    Wait,
}

/// Payload of `action_required`. Action-specific extras are omitted when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionPrompt {
    pub action: ActionKind,
    pub prompt: String,
    pub valid_targets: Vec<ParticipantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teammates: Option<Vec<ParticipantId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eliminator_target: Option<ParticipantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_save: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_poison: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u64>,
}

impl ActionPrompt {
    pub fn new(action: ActionKind, prompt: impl Into<String>) -> Self {
        Self {
            action,
            prompt: prompt.into(),
            valid_targets: Vec::new(),
            teammates: None,
            eliminator_target: None,
            can_save: None,
            can_poison: None,
            time_limit_secs: None,
        }
    }

    pub fn with_targets(mut self, targets: Vec<ParticipantId>) -> Self {
        self.valid_targets = targets;
        self
    }

    pub fn with_teammates(mut self, teammates: Vec<ParticipantId>) -> Self {
        self.teammates = Some(teammates);
        self
    }

    pub fn with_time_limit(mut self, secs: u64) -> Self {
        self.time_limit_secs = Some(secs);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealedRole {
    pub id: ParticipantId,
    pub name: String,
    pub role: Role,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GameEvent {
    GameCreated {
        session_id: Uuid,
        human_id: ParticipantId,
        participants: Vec<PublicParticipant>,
    },
    RoleAssigned {
        participant_id: ParticipantId,
        role: Role,
        role_name: String,
        description: String,
        teammates: Vec<ParticipantId>,
    },
    GameStarted {
        participants: Vec<PublicParticipant>,
    },
    PhaseChange {
        phase: Phase,
        label: String,
        round: u32,
    },
    Announcement {
        message: String,
    },
    ActionRequired(ActionPrompt),
    SpeakerTurn {
        speaker_id: ParticipantId,
        speaker_name: String,
        time_limit_secs: u64,
    },
    Thinking {
        participant_id: ParticipantId,
    },
    Speech {
        speaker_name: String,
        #[serde(flatten)]
        record: SpeechRecord,
    },
    InvestigationResult {
        round: u32,
        target_id: ParticipantId,
        is_hostile: bool,
    },
    NightResult {
        deaths: Vec<DeathRecord>,
        messages: Vec<String>,
        participants: Vec<PublicParticipant>,
    },
    ReadyToVote,
    VoteReset,
    VoteCast {
        voter_id: ParticipantId,
        target_id: ParticipantId,
    },
    VoteResult {
        tallies: BTreeMap<ParticipantId, u32>,
        ballots: BTreeMap<ParticipantId, ParticipantId>,
        executed_id: Option<ParticipantId>,
        is_tie: bool,
    },
    RetaliationResult {
        retaliator_id: ParticipantId,
        target_id: Option<ParticipantId>,
    },
    GameOver {
        result: GameResult,
        roles: Vec<RevealedRole>,
    },
}

impl GameEvent {
    /// Wire tag, handy for logs and assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::GameCreated { .. } => "game_created",
            GameEvent::RoleAssigned { .. } => "role_assigned",
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::PhaseChange { .. } => "phase_change",
            GameEvent::Announcement { .. } => "announcement",
            GameEvent::ActionRequired(_) => "action_required",
            GameEvent::SpeakerTurn { .. } => "speaker_turn",
            GameEvent::Thinking { .. } => "thinking",
            GameEvent::Speech { .. } => "speech",
            GameEvent::InvestigationResult { .. } => "investigation_result",
            GameEvent::NightResult { .. } => "night_result",
            GameEvent::ReadyToVote => "ready_to_vote",
            GameEvent::VoteReset => "vote_reset",
            GameEvent::VoteCast { .. } => "vote_cast",
            GameEvent::VoteResult { .. } => "vote_result",
            GameEvent::RetaliationResult { .. } => "retaliation_result",
            GameEvent::GameOver { .. } => "game_over",
        }
    }

    pub fn phase_change(phase: Phase, round: u32) -> Self {
        GameEvent::PhaseChange {
            phase,
            label: phase.label().to_string(),
            round,
        }
    }

    pub fn announce(message: impl Into<String>) -> Self {
        GameEvent::Announcement {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn events_use_type_and_data_envelope() {
        let event = GameEvent::phase_change(Phase::FinalStatement, 2);
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(
            value,
            json!({
                "type": "phase_change",
                "data": {"phase": "final_statement", "label": "last statement", "round": 2}
            })
        );
        assert_eq!(event.kind(), "phase_change");
    }

    #[test]
    fn prompt_omits_unset_extras() {
        let prompt = ActionPrompt::new(ActionKind::Vote, "Vote").with_targets(vec![1, 2]);
        let value = serde_json::to_value(GameEvent::ActionRequired(prompt)).expect("serialize");
        assert_eq!(value["data"]["action"], "vote");
        assert_eq!(value["data"]["valid_targets"], json!([1, 2]));
        assert!(value["data"].get("teammates").is_none());
    }

    #[test]
    fn unit_events_serialize_without_data() {
        let value = serde_json::to_value(GameEvent::ReadyToVote).expect("serialize");
        assert_eq!(value, json!({"type": "ready_to_vote"}));
    }

    #[test]
    fn speech_flattens_the_log_record() {
        let event = GameEvent::Speech {
            speaker_name: "Player 2".into(),
            record: SpeechRecord {
                speaker_id: 2,
                text: "hello".into(),
                round: 1,
                phase: Phase::DayDiscuss,
            },
        };
        let value = serde_json::to_value(event).expect("serialize");
        assert_eq!(value["data"]["speaker_id"], 2);
        assert_eq!(value["data"]["phase"], "day_discuss");
    }
}
