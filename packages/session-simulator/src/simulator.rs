//! Runs one complete session with the autopilot in the human seat.

use std::sync::Arc;
use std::time::{Duration, Instant};

use nightfall_backend::ai::registry::ProviderFactory;
use nightfall_backend::ai::{provider_for, DecisionProvider};
use nightfall_backend::config::{DecisionBackend, GameConfig, SessionTimings};
use nightfall_backend::domain::{GameResult, ParticipantId, Role, Status};
use nightfall_backend::protocol::{ChannelSink, Command, GameEvent};
use nightfall_backend::{spawn_session, SessionController};
use tracing::{debug, warn};

use crate::autopilot::Autopilot;

/// Upper bound for one simulated session.
const GAME_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct SeatOutcome {
    pub id: ParticipantId,
    pub role: Role,
    pub survived: bool,
}

/// Result of simulating one session.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub result: GameResult,
    pub rounds: u32,
    pub human_seat: ParticipantId,
    pub seats: Vec<SeatOutcome>,
    /// Prompts the autopilot answered.
    pub commands_sent: u32,
    pub duration: Duration,
}

impl GameOutcome {
    pub fn human_role(&self) -> Option<Role> {
        self.seats
            .iter()
            .find(|s| s.id == self.human_seat)
            .map(|s| s.role)
    }
}

#[derive(Debug)]
pub enum SimulationError {
    /// The session did not finish within [`GAME_TIMEOUT`].
    TimedOut,
    /// The session stopped without a result.
    Abandoned { rounds: u32 },
    Setup(String),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::TimedOut => write!(f, "session did not finish in time"),
            SimulationError::Abandoned { rounds } => {
                write!(f, "session stopped without a result after {rounds} rounds")
            }
            SimulationError::Setup(msg) => write!(f, "session setup failed: {msg}"),
        }
    }
}

impl std::error::Error for SimulationError {}

/// Where the autonomous seats get their decisions from.
pub enum ProviderSource {
    Registered(&'static ProviderFactory),
    Configured(DecisionBackend),
}

impl ProviderSource {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderSource::Registered(factory) => factory.name,
            ProviderSource::Configured(backend) => backend.name(),
        }
    }

    fn build(&self, seed: u64) -> Arc<dyn DecisionProvider> {
        match self {
            ProviderSource::Registered(factory) => (factory.make)(Some(seed)),
            ProviderSource::Configured(backend) => provider_for(backend, Some(seed)),
        }
    }
}

pub struct Simulator {
    config: GameConfig,
    provider: ProviderSource,
}

impl Simulator {
    /// Sessions run without pacing; the configured timeouts still apply.
    pub fn new(config: GameConfig, provider: ProviderSource) -> Self {
        let config = GameConfig {
            timings: SessionTimings::instant()
                .with_vote_timeout(config.timings.vote_timeout)
                .with_statement_timeout(config.timings.statement_timeout),
            ..config
        };
        Self { config, provider }
    }

    pub async fn simulate_game(&self, seed: u64) -> Result<GameOutcome, SimulationError> {
        let started = Instant::now();
        let (sink, mut events) = ChannelSink::pair();
        let controller = SessionController::builder("Autopilot")
            .config(self.config.clone())
            .seed(seed)
            .provider(self.provider.build(seed))
            .sink(Arc::new(sink))
            .build()
            .map_err(|e| SimulationError::Setup(e.to_string()))?;
        let human_seat = controller.state().human_id();

        let handle = spawn_session(controller);
        let commands = handle.commands.clone();
        let mut pilot = Autopilot::new(seed.wrapping_add(1));
        let mut commands_sent = 0;
        let mut seats = Vec::new();

        let play = async {
            if commands.send(Command::StartGame).await.is_err() {
                return;
            }
            while let Some(event) = events.recv().await {
                match event {
                    GameEvent::ActionRequired(prompt) => {
                        let Some(command) = pilot.answer(&prompt) else {
                            continue;
                        };
                        debug!(command = command.name(), "Autopilot answers");
                        if commands.send(command).await.is_err() {
                            break;
                        }
                        commands_sent += 1;
                    }
                    GameEvent::GameOver { roles, .. } => {
                        seats = roles
                            .into_iter()
                            .map(|r| SeatOutcome {
                                id: r.id,
                                role: r.role,
                                survived: r.status == Status::Alive,
                            })
                            .collect();
                    }
                    _ => {}
                }
            }
        };
        if tokio::time::timeout(GAME_TIMEOUT, play).await.is_err() {
            warn!(seed, "Simulated session timed out");
            handle.task.abort();
            return Err(SimulationError::TimedOut);
        }

        drop(commands);
        let summary = handle.join().await;
        if summary.result == GameResult::Ongoing {
            return Err(SimulationError::Abandoned {
                rounds: summary.rounds,
            });
        }

        Ok(GameOutcome {
            result: summary.result,
            rounds: summary.rounds,
            human_seat,
            seats,
            commands_sent,
            duration: started.elapsed(),
        })
    }
}
