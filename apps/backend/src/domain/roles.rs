//! Role rule set: one atomic change per call, `bool`/`Option` outcome, no I/O.
//!
//! Invalid targets are not errors here; the action simply does not apply.

use crate::domain::participant::{DeathCause, ParticipantId, Role, Status};
use crate::domain::state::{GameState, Investigation};

/// Records the eliminators' target. Intent only; dawn applies it.
pub fn eliminate(state: &mut GameState, target: ParticipantId) -> bool {
    if !state.is_alive(target) {
        return false;
    }
    match state.night_action_mut() {
        Some(record) => {
            record.eliminator_target = Some(target);
            true
        }
        None => false,
    }
}

/// Returns whether `target` is hostile, or `None` if the check could not happen.
pub fn investigate(state: &mut GameState, target: ParticipantId) -> Option<bool> {
    let is_hostile = state
        .participant(target)
        .filter(|p| p.is_alive())
        .map(|p| p.is_hostile())?;
    let record = state.night_action_mut()?;
    record.investigation = Some(Investigation {
        target_id: target,
        is_hostile,
    });
    Some(is_hostile)
}

pub fn protect(state: &mut GameState) -> bool {
    if state.charges.protect == 0 {
        return false;
    }
    let Some(record) = state.night_action_mut() else {
        return false;
    };
    record.protector_save = true;
    state.charges.protect -= 1;
    true
}

pub fn poison(state: &mut GameState, target: ParticipantId) -> bool {
    if state.charges.poison == 0 || !state.is_alive(target) {
        return false;
    }
    let Some(record) = state.night_action_mut() else {
        return false;
    };
    record.poison_target = Some(target);
    state.charges.poison -= 1;
    true
}

/// Immediate elimination by an already-eliminated Retaliator.
///
/// A poisoned Retaliator never gets the shot.
pub fn retaliate(state: &mut GameState, actor: ParticipantId, target: ParticipantId) -> bool {
    let Some(retaliator) = state.participant(actor) else {
        return false;
    };
    if !retaliator.has_role(Role::Retaliator) || retaliator.status() != Status::Eliminated {
        return false;
    }
    if actor == target || !state.is_alive(target) {
        return false;
    }
    state.eliminate(target, DeathCause::Retaliation).is_some()
}

/// Protection is only offered when there is someone to save.
pub fn can_save(state: &GameState) -> bool {
    state.charges.protect > 0
        && state
            .night_action()
            .is_some_and(|r| r.eliminator_target.is_some() && !r.protector_save)
}

pub fn can_poison(state: &GameState) -> bool {
    state.charges.poison > 0
        && state
            .night_action()
            .is_some_and(|r| r.poison_target.is_none())
}

pub fn alive_targets(state: &GameState) -> Vec<ParticipantId> {
    state.alive_ids()
}

pub fn alive_except(state: &GameState, actor: ParticipantId) -> Vec<ParticipantId> {
    state.alive().map(|p| p.id).filter(|id| *id != actor).collect()
}

/// Eliminators may pick anyone alive, teammates and themselves included.
pub fn eliminator_targets(state: &GameState) -> Vec<ParticipantId> {
    alive_targets(state)
}

pub fn investigator_targets(state: &GameState, actor: ParticipantId) -> Vec<ParticipantId> {
    alive_except(state, actor)
}

pub fn poison_targets(state: &GameState, actor: ParticipantId) -> Vec<ParticipantId> {
    alive_except(state, actor)
}

pub fn retaliation_targets(state: &GameState, actor: ParticipantId) -> Vec<ParticipantId> {
    alive_except(state, actor)
}

pub fn vote_targets(state: &GameState, voter: ParticipantId) -> Vec<ParticipantId> {
    alive_except(state, voter)
}

/// Valid night targets for `role` acting as `actor`.
pub fn night_targets(state: &GameState, role: Role, actor: ParticipantId) -> Vec<ParticipantId> {
    match role {
        Role::Eliminator => eliminator_targets(state),
        Role::Investigator => investigator_targets(state, actor),
        Role::Protector => poison_targets(state, actor),
        Role::Retaliator => retaliation_targets(state, actor),
        Role::Bystander => Vec::new(),
    }
}
