//! Domain layer: session entities and the role rule set. Pure, no I/O.

pub mod errors;
pub mod participant;
pub mod player_view;
pub mod roles;
pub mod rules;
pub mod state;

#[cfg(test)]
pub(crate) mod test_gens;
#[cfg(test)]
mod tests_props_roles;

// Re-exports for ergonomics
pub use errors::DomainError;
pub use participant::{
    DeathCause, DeathRecord, Faction, Participant, ParticipantId, Role, Status,
};
pub use player_view::{public_roster, PublicParticipant, VisibleState};
pub use rules::RoleCounts;
pub use state::{
    Charges, GameResult, GameState, InvestigationRecord, NightActionRecord, PendingRetaliation,
    Phase, RetaliationOrigin, SpeechRecord,
};
