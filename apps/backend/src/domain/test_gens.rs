// Proptest generators for domain types.
// Tables are always legal deals: eliminators start as a minority and every
// special role appears at most once.

use proptest::prelude::*;
use uuid::Uuid;

use crate::domain::{GameState, ParticipantId, Role};

/// A legal role deck for 5..=12 seats, seat 1 first.
pub fn deck() -> impl Strategy<Value = Vec<Role>> {
    (5u8..=12)
        .prop_flat_map(|count| {
            (
                Just(count),
                1..=(count - 1) / 2,
                any::<bool>(),
                any::<bool>(),
                any::<bool>(),
            )
        })
        .prop_flat_map(|(count, eliminators, investigator, protector, retaliator)| {
            let mut deck = vec![Role::Eliminator; usize::from(eliminators)];
            for (present, role) in [
                (investigator, Role::Investigator),
                (protector, Role::Protector),
                (retaliator, Role::Retaliator),
            ] {
                if present {
                    deck.push(role);
                }
            }
            deck.resize(usize::from(count), Role::Bystander);
            Just(deck).prop_shuffle()
        })
}

/// A dealt table with the human in a random seat.
pub fn table() -> impl Strategy<Value = GameState> {
    deck()
        .prop_flat_map(|deck| {
            let count = deck.len() as u8;
            (Just(deck), 1..=count)
        })
        .prop_map(|(deck, human)| {
            let mut state = GameState::new(Uuid::nil(), deck.len() as u8, human, "Tester")
                .expect("valid table");
            state.assign_roles(&deck).expect("deck fits table");
            state
        })
}

/// A table plus one optional ballot per seat. Ballots may name anyone, the
/// voter included.
pub fn table_with_ballots() -> impl Strategy<Value = (GameState, Vec<Option<ParticipantId>>)> {
    table().prop_flat_map(|state| {
        let count = state.participants().len();
        let ballots = prop::collection::vec(prop::option::of(1..=count as ParticipantId), count);
        (Just(state), ballots)
    })
}
