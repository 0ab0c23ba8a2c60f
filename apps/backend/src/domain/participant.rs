//! Participants, roles and factions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Stable seat number, 1..=N.
pub type ParticipantId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Eliminator,
    Investigator,
    /// Holds both the protection and the poison charge.
    Protector,
    Retaliator,
    Bystander,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Hostile,
    Good,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Eliminator,
        Role::Investigator,
        Role::Protector,
        Role::Retaliator,
        Role::Bystander,
    ];

    pub fn faction(self) -> Faction {
        match self {
            Role::Eliminator => Faction::Hostile,
            _ => Faction::Good,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Eliminator => "eliminator",
            Role::Investigator => "investigator",
            Role::Protector => "protector",
            Role::Retaliator => "retaliator",
            Role::Bystander => "bystander",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Role::Eliminator => "Eliminator",
            Role::Investigator => "Investigator",
            Role::Protector => "Protector",
            Role::Retaliator => "Retaliator",
            Role::Bystander => "Bystander",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::Eliminator => {
                "Each night, agree with your teammates on one participant to eliminate. \
                 Win when your faction is at least as large as everyone else."
            }
            Role::Investigator => {
                "Each night, learn whether one participant belongs to the hostile faction."
            }
            Role::Protector => {
                "You hold one protection and one poison. Protection saves the night's target; \
                 poison eliminates anyone you choose."
            }
            Role::Retaliator => {
                "When you are eliminated, except by poison, you may take one participant with you."
            }
            Role::Bystander => "No night action. Find the eliminators through discussion and votes.",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::ParseRole(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Alive,
    Eliminated,
    /// Poisoned. Distinct from `Eliminated` because it forbids retaliation.
    EliminatedByToxin,
}

/// Why a participant left play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    NightElimination,
    Toxin,
    Vote,
    Retaliation,
}

impl DeathCause {
    fn resulting_status(self) -> Status {
        match self {
            DeathCause::Toxin => Status::EliminatedByToxin,
            _ => Status::Eliminated,
        }
    }
}

/// Structured death entry; rendered text is derived from it, never the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub participant_id: ParticipantId,
    pub cause: DeathCause,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub is_human: bool,
    role: Option<Role>,
    status: Status,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>, is_human: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_human,
            role: None,
            status: Status::Alive,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_alive(&self) -> bool {
        self.status == Status::Alive
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    pub fn is_hostile(&self) -> bool {
        self.role.map(Role::faction) == Some(Faction::Hostile)
    }

    /// Roles are dealt exactly once.
    pub fn assign_role(&mut self, role: Role) -> Result<(), DomainError> {
        if self.role.is_some() {
            return Err(DomainError::RoleAlreadyAssigned(self.id));
        }
        self.role = Some(role);
        Ok(())
    }

    /// Alive -> Eliminated / EliminatedByToxin. Returns false if already out.
    pub fn eliminate(&mut self, cause: DeathCause) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.status = cause.resulting_status();
        true
    }
}
