use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::domain::participant::ParticipantId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Configuration or input that can never produce a playable session.
    Validation(String),
    UnknownParticipant(ParticipantId),
    RoleAlreadyAssigned(ParticipantId),
    /// Role deck length does not match the participant list.
    DeckMismatch { deck: usize, participants: usize },
    ParseRole(String),
    Other(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(s) => write!(f, "validation: {s}"),
            DomainError::UnknownParticipant(id) => write!(f, "unknown participant {id}"),
            DomainError::RoleAlreadyAssigned(id) => {
                write!(f, "participant {id} already has a role")
            }
            DomainError::DeckMismatch { deck, participants } => write!(
                f,
                "role deck has {deck} roles for {participants} participants"
            ),
            DomainError::ParseRole(s) => write!(f, "parse role: {s}"),
            DomainError::Other(s) => write!(f, "domain error: {s}"),
        }
    }
}

impl Error for DomainError {}
