use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::participant::Role;

pub const DEFAULT_PLAYER_COUNT: u8 = 7;
pub const MIN_PLAYERS: u8 = 4;
pub const MAX_PLAYERS: u8 = 16;
pub const DEFAULT_SPEECH_TIME_LIMIT_SECS: u64 = 30;

/// How many of each role are dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    pub eliminator: u8,
    pub investigator: u8,
    pub protector: u8,
    pub retaliator: u8,
    pub bystander: u8,
}

impl Default for RoleCounts {
    fn default() -> Self {
        Self {
            eliminator: 2,
            investigator: 1,
            protector: 1,
            retaliator: 1,
            bystander: 2,
        }
    }
}

impl RoleCounts {
    pub fn count(&self, role: Role) -> u8 {
        match role {
            Role::Eliminator => self.eliminator,
            Role::Investigator => self.investigator,
            Role::Protector => self.protector,
            Role::Retaliator => self.retaliator,
            Role::Bystander => self.bystander,
        }
    }

    fn count_mut(&mut self, role: Role) -> &mut u8 {
        match role {
            Role::Eliminator => &mut self.eliminator,
            Role::Investigator => &mut self.investigator,
            Role::Protector => &mut self.protector,
            Role::Retaliator => &mut self.retaliator,
            Role::Bystander => &mut self.bystander,
        }
    }

    pub fn total(&self) -> usize {
        Role::ALL.iter().map(|r| self.count(*r) as usize).sum()
    }

    /// Flat token list in `Role::ALL` order, ready to be shuffled.
    pub fn deck(&self) -> Vec<Role> {
        Role::ALL
            .iter()
            .flat_map(|r| std::iter::repeat(*r).take(self.count(*r) as usize))
            .collect()
    }

    pub fn validate(&self, player_count: u8) -> Result<(), DomainError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(DomainError::Validation(format!(
                "player count {player_count} outside {MIN_PLAYERS}..={MAX_PLAYERS}"
            )));
        }
        if self.total() != player_count as usize {
            return Err(DomainError::Validation(format!(
                "role counts add up to {} but there are {player_count} players",
                self.total()
            )));
        }
        if self.eliminator == 0 {
            return Err(DomainError::Validation("at least one eliminator is required".into()));
        }
        if self.eliminator as usize * 2 >= player_count as usize {
            return Err(DomainError::Validation(
                "eliminators must start as a minority".into(),
            ));
        }
        for role in [Role::Investigator, Role::Protector, Role::Retaliator] {
            if self.count(role) > 1 {
                return Err(DomainError::Validation(format!(
                    "at most one {} is supported",
                    role.as_str()
                )));
            }
        }
        Ok(())
    }
}

/// Parses `eliminator=2,investigator=1,...`. Roles left out count as zero.
impl FromStr for RoleCounts {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut counts = RoleCounts {
            eliminator: 0,
            investigator: 0,
            protector: 0,
            retaliator: 0,
            bystander: 0,
        };
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| DomainError::Validation(format!("expected role=count, got {pair:?}")))?;
            let role: Role = name.parse()?;
            let n: u8 = value.trim().parse().map_err(|_| {
                DomainError::Validation(format!("bad count for {}: {value:?}", role.as_str()))
            })?;
            *counts.count_mut(role) = n;
        }
        Ok(counts)
    }
}
