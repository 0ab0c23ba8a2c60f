//! Session services: round bookkeeping, the session controller and its task runner.

pub mod game_flow;
pub mod round_orchestrator;
pub mod session_runner;

#[cfg(test)]
mod tests_props_orchestrator;

pub use game_flow::{SessionBuilder, SessionController, Suspension};
pub use round_orchestrator::{NightOutcome, RoundOrchestrator, TallyVerdict, VoteOutcome};
pub use session_runner::{spawn_session, SessionHandle, SessionSummary};
