//! Property tests for the round orchestrator.
//!
//! Properties tested:
//! - Tallies account for every ballot and only a unique leader is executed
//! - Discussion visits the living in ascending seat order
//! - Win evaluation follows the faction counts
//! - The round counter only moves on night entry, one step at a time
//! - Shuffled deals keep the configured role counts

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::domain::test_gens::{deck, table, table_with_ballots};
use crate::domain::{DeathCause, Faction, GameResult, GameState, Role, RoleCounts};
use crate::services::round_orchestrator::{evaluate_win, RoundOrchestrator, TallyVerdict};

fn counts_of(deck: &[Role]) -> RoleCounts {
    let n = |role: Role| deck.iter().filter(|r| **r == role).count() as u8;
    RoleCounts {
        eliminator: n(Role::Eliminator),
        investigator: n(Role::Investigator),
        protector: n(Role::Protector),
        retaliator: n(Role::Retaliator),
        bystander: n(Role::Bystander),
    }
}

proptest! {
    #![proptest_config(nightfall_test_support::props::config())]

    /// Property: every ballot is counted and only a unique leader dies
    #[test]
    fn prop_tally_executes_only_a_unique_leader((state, ballots) in table_with_ballots()) {
        let mut state = state;
        let orch = RoundOrchestrator::new(RoleCounts::default());
        for (voter, target) in ballots.iter().enumerate() {
            if let Some(target) = target {
                state.record_vote((voter + 1) as u8, *target);
            }
        }
        let cast = state.votes().len();
        let alive_before = state.alive_count();

        let outcome = orch.tally_votes(&mut state);

        prop_assert_eq!(outcome.tallies.values().sum::<u32>() as usize, cast);
        prop_assert!(state.votes().is_empty());
        let max = outcome.tallies.values().copied().max();
        let leaders: Vec<_> = outcome
            .tallies
            .iter()
            .filter(|(_, n)| Some(**n) == max)
            .map(|(id, _)| *id)
            .collect();

        match &outcome.verdict {
            TallyVerdict::NoVotes => {
                prop_assert_eq!(cast, 0);
                prop_assert_eq!(state.alive_count(), alive_before);
            }
            TallyVerdict::Tie(tied) => {
                prop_assert!(tied.len() >= 2);
                prop_assert_eq!(tied, &leaders);
                prop_assert_eq!(state.alive_count(), alive_before);
            }
            TallyVerdict::Executed(id) => {
                prop_assert_eq!(vec![*id], leaders);
                prop_assert!(!state.is_alive(*id));
                prop_assert_eq!(state.alive_count(), alive_before - 1);
            }
        }
    }

    /// Property: the speaking order is the ascending list of the living
    #[test]
    fn prop_speaking_order_is_ascending(state in table(), dead in prop::collection::vec(any::<prop::sample::Index>(), 0..3)) {
        let mut state = state;
        for pick in dead {
            let ids = state.alive_ids();
            if ids.len() > 1 {
                state.eliminate(ids[pick.index(ids.len())], DeathCause::Vote);
            }
        }
        let mut orch = RoundOrchestrator::new(RoleCounts::default());
        let expected = state.alive_ids();

        let mut visited = Vec::new();
        let mut speaker = orch.start_discussion(&mut state);
        while let Some(id) = speaker {
            visited.push(id);
            speaker = orch.advance_speaker(&mut state);
        }

        prop_assert_eq!(&visited, &expected);
        prop_assert!(visited.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(state.current_speaker, None);
    }

    /// Property: win evaluation follows the living faction counts
    #[test]
    fn prop_win_follows_faction_counts(state in table(), dead in prop::collection::vec(any::<prop::sample::Index>(), 0..8)) {
        let mut state = state;
        for pick in dead {
            let ids = state.alive_ids();
            if !ids.is_empty() {
                state.eliminate(ids[pick.index(ids.len())], DeathCause::NightElimination);
            }
        }
        let hostile = state.alive().filter(|p| p.role().map(Role::faction) == Some(Faction::Hostile)).count();
        let good = state.alive_count() - hostile;

        let expected = if hostile == 0 {
            GameResult::GoodWin
        } else if hostile >= good {
            GameResult::HostileWin
        } else {
            GameResult::Ongoing
        };
        prop_assert_eq!(evaluate_win(&state), expected);
    }

    /// Property: rounds increase by exactly one per night and never otherwise
    #[test]
    fn prop_rounds_are_monotonic(state in table(), nights in 1u32..6) {
        let mut state = state;
        let orch = RoundOrchestrator::new(RoleCounts::default());
        prop_assert_eq!(state.round(), 0);
        for night in 1..=nights {
            prop_assert_eq!(state.enter_night(), night);
            orch.resolve_night(&mut state);
            orch.tally_votes(&mut state);
            prop_assert_eq!(state.round(), night);
        }
    }

    /// Property: shuffled deals keep the configured counts
    #[test]
    fn prop_shuffled_deal_keeps_counts(deck in deck(), seed in any::<u64>()) {
        let counts = counts_of(&deck);
        let orch = RoundOrchestrator::new(counts);
        let mut state = GameState::new(Uuid::nil(), deck.len() as u8, 1, "Tester").expect("state");
        let mut rng = StdRng::seed_from_u64(seed);
        orch.assign_roles(&mut state, &mut rng).expect("deal");

        prop_assert!(state.roles_assigned());
        for role in Role::ALL {
            prop_assert_eq!(state.alive_with_role(role).len(), usize::from(counts.count(role)));
        }
    }
}
