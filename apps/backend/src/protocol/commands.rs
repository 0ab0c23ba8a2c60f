//! Inbound commands. Each one resumes exactly one kind of suspension.

use serde::{Deserialize, Serialize};

use crate::domain::ParticipantId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum Command {
    StartGame,
    ConfirmRole,
    EliminatorTarget {
        target_id: ParticipantId,
    },
    InvestigatorTarget {
        target_id: ParticipantId,
    },
    /// Protector's whole night in one message: save and/or poison.
    ProtectorAction {
        #[serde(default)]
        save: bool,
        #[serde(default)]
        poison_target: Option<ParticipantId>,
    },
    Speak {
        content: String,
    },
    FinalStatement {
        content: String,
    },
    BeginVoting,
    Vote {
        target_id: ParticipantId,
    },
    /// `None` passes on the shot.
    RetaliationTarget {
        #[serde(default)]
        target_id: Option<ParticipantId>,
    },
    EnterNight,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::StartGame => "start_game",
            Command::ConfirmRole => "confirm_role",
            Command::EliminatorTarget { .. } => "eliminator_target",
            Command::InvestigatorTarget { .. } => "investigator_target",
            Command::ProtectorAction { .. } => "protector_action",
            Command::Speak { .. } => "speak",
            Command::FinalStatement { .. } => "final_statement",
            Command::BeginVoting => "begin_voting",
            Command::Vote { .. } => "vote",
            Command::RetaliationTarget { .. } => "retaliation_target",
            Command::EnterNight => "enter_night",
        }
    }
}
