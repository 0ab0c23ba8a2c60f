//! Round orchestrator: dealing, night resolution, speaking order, vote tally
//! and win evaluation.
//!
//! Stateful only where the round needs memory (the speaking order); every
//! other operation reads or mutates the [`GameState`] it is handed.

use std::collections::BTreeMap;

use rand::prelude::*;
use tracing::{debug, info};

use crate::domain::{
    DeathCause, DeathRecord, DomainError, Faction, GameResult, GameState, ParticipantId, Role,
    RoleCounts,
};

/// Deaths produced by one dawn, with text derived from the structured records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightOutcome {
    pub deaths: Vec<DeathRecord>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyVerdict {
    NoVotes,
    Executed(ParticipantId),
    /// Two or more participants share the top count.
    Tie(Vec<ParticipantId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub tallies: BTreeMap<ParticipantId, u32>,
    /// Voter -> target, as cast.
    pub ballots: BTreeMap<ParticipantId, ParticipantId>,
    pub verdict: TallyVerdict,
}

impl VoteOutcome {
    pub fn executed(&self) -> Option<ParticipantId> {
        match self.verdict {
            TallyVerdict::Executed(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self.verdict, TallyVerdict::Tie(_))
    }
}

/// Counts ballots and picks the unique maximum, if there is one.
pub fn tally(
    ballots: &BTreeMap<ParticipantId, ParticipantId>,
) -> (BTreeMap<ParticipantId, u32>, TallyVerdict) {
    let mut tallies: BTreeMap<ParticipantId, u32> = BTreeMap::new();
    for target in ballots.values() {
        *tallies.entry(*target).or_default() += 1;
    }

    let Some(max) = tallies.values().copied().max() else {
        return (tallies, TallyVerdict::NoVotes);
    };
    let leaders: Vec<ParticipantId> = tallies
        .iter()
        .filter(|(_, count)| **count == max)
        .map(|(id, _)| *id)
        .collect();

    let verdict = match leaders.as_slice() {
        [single] => TallyVerdict::Executed(*single),
        _ => TallyVerdict::Tie(leaders),
    };
    (tallies, verdict)
}

/// hostile == 0 -> good wins; hostile >= good -> hostile wins, unless a
/// Retaliator's shot is still pending; otherwise ongoing.
pub fn evaluate_win(state: &GameState) -> GameResult {
    let (hostile, good) = state.alive().fold((0usize, 0usize), |(h, g), p| {
        match p.role().map(Role::faction) {
            Some(Faction::Hostile) => (h + 1, g),
            _ => (h, g + 1),
        }
    });

    if hostile == 0 {
        GameResult::GoodWin
    } else if hostile >= good {
        if state.is_retaliation_pending() {
            GameResult::Ongoing
        } else {
            GameResult::HostileWin
        }
    } else {
        GameResult::Ongoing
    }
}

#[derive(Debug, Clone)]
pub struct RoundOrchestrator {
    role_counts: RoleCounts,
    speaking_order: Vec<ParticipantId>,
    cursor: usize,
}

impl RoundOrchestrator {
    pub fn new(role_counts: RoleCounts) -> Self {
        Self {
            role_counts,
            speaking_order: Vec::new(),
            cursor: 0,
        }
    }

    pub fn role_counts(&self) -> &RoleCounts {
        &self.role_counts
    }

    /// Shuffles the configured deck and deals it in seat order.
    pub fn assign_roles<R: Rng + ?Sized>(
        &self,
        state: &mut GameState,
        rng: &mut R,
    ) -> Result<(), DomainError> {
        let mut deck = self.role_counts.deck();
        deck.shuffle(rng);
        self.assign_fixed(state, &deck)
    }

    /// Deals a predetermined deck, seat `i + 1` receiving `deck[i]`.
    pub fn assign_fixed(&self, state: &mut GameState, deck: &[Role]) -> Result<(), DomainError> {
        state.assign_roles(deck)?;
        info!(
            session_id = %state.session_id,
            participants = deck.len(),
            "Roles dealt"
        );
        Ok(())
    }

    /// Applies the night record and discards it.
    ///
    /// The eliminators' target dies unless saved. Poison always lands; if it
    /// names the same participant the death is recorded as toxin.
    pub fn resolve_night(&self, state: &mut GameState) -> NightOutcome {
        let Some(record) = state.take_night_action() else {
            return NightOutcome::default();
        };

        let mut deaths = Vec::new();
        if let Some(target) = record.eliminator_target {
            let poisoned_too = record.poison_target == Some(target);
            if !record.protector_save && !poisoned_too {
                deaths.extend(state.eliminate(target, DeathCause::NightElimination));
            }
        }
        if let Some(target) = record.poison_target {
            deaths.extend(state.eliminate(target, DeathCause::Toxin));
        }

        let messages = deaths
            .iter()
            .map(|d| format!("{} died last night", state.name_of(d.participant_id)))
            .collect();

        debug!(
            session_id = %state.session_id,
            round = state.round(),
            saved = record.protector_save,
            deaths = deaths.len(),
            "Night resolved"
        );

        NightOutcome { deaths, messages }
    }

    /// Ascending alive ids; the first becomes the current speaker.
    pub fn start_discussion(&mut self, state: &mut GameState) -> Option<ParticipantId> {
        self.speaking_order = state.alive_ids();
        self.cursor = 0;
        state.current_speaker = self.speaking_order.first().copied();
        state.current_speaker
    }

    /// Moves to the next alive speaker; `None` once the order is exhausted.
    pub fn advance_speaker(&mut self, state: &mut GameState) -> Option<ParticipantId> {
        while self.cursor < self.speaking_order.len() {
            self.cursor += 1;
            match self.speaking_order.get(self.cursor) {
                Some(id) if state.is_alive(*id) => {
                    state.current_speaker = Some(*id);
                    return Some(*id);
                }
                Some(_) => continue,
                None => break,
            }
        }
        state.current_speaker = None;
        None
    }

    pub fn speaking_order(&self) -> &[ParticipantId] {
        &self.speaking_order
    }

    /// Tallies the vote map, executes a unique leader, and always clears the map.
    pub fn tally_votes(&self, state: &mut GameState) -> VoteOutcome {
        let ballots = state.votes().clone();
        let (tallies, verdict) = tally(&ballots);
        state.clear_votes();

        if let TallyVerdict::Executed(id) = verdict {
            state.eliminate(id, DeathCause::Vote);
        }

        VoteOutcome {
            tallies,
            ballots,
            verdict,
        }
    }

    pub fn evaluate_win(&self, state: &GameState) -> GameResult {
        evaluate_win(state)
    }
}
