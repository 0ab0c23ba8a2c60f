//! Property tests for the role rule set (pure domain).
//!
//! Properties tested:
//! - Investigation reports exactly the target's faction
//! - Protection and poison are spent at most once per session
//! - Only a Retaliator eliminated by a non-toxin cause may shoot
//! - Night intent never lands on the dead
//! - Ballots involving the dead are never recorded

use proptest::prelude::*;

use crate::domain::test_gens::{table, table_with_ballots};
use crate::domain::{roles, DeathCause, Faction, Role};

proptest! {
    #![proptest_config(nightfall_test_support::props::config())]

    /// Property: the investigation answer matches the target's faction
    #[test]
    fn prop_investigation_matches_faction(state in table(), pick in any::<prop::sample::Index>()) {
        let mut state = state;
        state.enter_night();
        let ids = state.alive_ids();
        let target = ids[pick.index(ids.len())];
        let expected = state.role_of(target).map(|r| r.faction() == Faction::Hostile);

        prop_assert_eq!(roles::investigate(&mut state, target), expected);
        let recorded = state.night_action().and_then(|r| r.investigation);
        prop_assert_eq!(recorded.map(|i| i.target_id), Some(target));
    }

    /// Property: each protector charge is spent once, whatever the night count
    #[test]
    fn prop_charges_are_single_use(state in table(), nights in 1u32..5) {
        let mut state = state;
        let mut saves = 0;
        let mut poisons = 0;
        for _ in 0..nights {
            state.enter_night();
            let alive = state.alive_ids();
            let Some(target) = alive.first().copied() else { break };
            roles::eliminate(&mut state, target);
            if roles::protect(&mut state) {
                saves += 1;
                prop_assert!(!roles::protect(&mut state), "second save in one night");
            }
            if roles::poison(&mut state, target) {
                poisons += 1;
            }
        }
        prop_assert!(saves <= 1);
        prop_assert!(poisons <= 1);
        prop_assert_eq!(state.charges.protect, 1 - saves);
        prop_assert_eq!(state.charges.poison, 1 - poisons);
    }

    /// Property: retaliation needs an Eliminated (not poisoned) Retaliator
    #[test]
    fn prop_retaliation_requires_a_shot(state in table(), poisoned in any::<bool>()) {
        let mut state = state;
        let Some(retaliator) = state
            .participants()
            .iter()
            .find(|p| p.has_role(Role::Retaliator))
            .map(|p| p.id)
        else {
            return Ok(());
        };
        let target = state
            .alive_ids()
            .into_iter()
            .find(|id| *id != retaliator)
            .expect("tables have several seats");

        // Alive Retaliators cannot shoot.
        prop_assert!(!roles::retaliate(&mut state, retaliator, target));

        let cause = if poisoned { DeathCause::Toxin } else { DeathCause::Vote };
        state.eliminate(retaliator, cause);
        let fired = roles::retaliate(&mut state, retaliator, target);
        prop_assert_eq!(fired, !poisoned);
        prop_assert_eq!(state.is_alive(target), poisoned);

        // One shot at most, and never at themselves.
        prop_assert!(!roles::retaliate(&mut state, retaliator, target));
        prop_assert!(!roles::retaliate(&mut state, retaliator, retaliator));
    }

    /// Property: night actions on the dead are rejected and leave no intent
    #[test]
    fn prop_dead_targets_are_rejected(state in table(), pick in any::<prop::sample::Index>()) {
        let mut state = state;
        let ids = state.alive_ids();
        let victim = ids[pick.index(ids.len())];
        state.eliminate(victim, DeathCause::Vote);
        state.enter_night();

        prop_assert!(!roles::eliminate(&mut state, victim));
        prop_assert_eq!(roles::investigate(&mut state, victim), None);
        prop_assert!(!roles::poison(&mut state, victim));
        let record = state.night_action().cloned().unwrap_or_default();
        prop_assert_eq!(record.eliminator_target, None);
        prop_assert_eq!(record.poison_target, None);
        prop_assert_eq!(state.charges.poison, 1);
    }

    /// Property: recorded ballots only ever involve living participants
    #[test]
    fn prop_ballots_involve_only_the_living((state, ballots) in table_with_ballots()) {
        let mut state = state;
        if let Some(victim) = state.alive_ids().last().copied() {
            state.eliminate(victim, DeathCause::NightElimination);
        }
        for (voter, target) in ballots.iter().enumerate() {
            let voter = (voter + 1) as u8;
            if let Some(target) = target {
                let accepted = state.record_vote(voter, *target);
                prop_assert_eq!(accepted, state.is_alive(voter) && state.is_alive(*target));
            }
        }
        for (voter, target) in state.votes() {
            prop_assert!(state.is_alive(*voter));
            prop_assert!(state.is_alive(*target));
        }
    }
}
