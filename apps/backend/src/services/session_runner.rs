//! Runs one [`SessionController`] on its own task.
//!
//! Commands arrive over a bounded channel and are applied one at a time, so
//! the controller never sees two resumptions at once. Suspensions that carry
//! a deadline are raced against the channel.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

use super::game_flow::{SessionController, Suspension};
use crate::domain::GameResult;
use crate::protocol::Command;

const COMMAND_BUFFER: usize = 64;

/// What is left of a session once its task ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub result: GameResult,
    pub rounds: u32,
    /// False when the event sink failed before the session ended.
    pub active: bool,
}

pub struct SessionHandle {
    pub session_id: Uuid,
    pub commands: mpsc::Sender<Command>,
    pub task: JoinHandle<SessionSummary>,
}

impl SessionHandle {
    /// Waits for the session task; a panicked task reports an ongoing result.
    pub async fn join(self) -> SessionSummary {
        let session_id = self.session_id;
        match self.task.await {
            Ok(summary) => summary,
            Err(err) => {
                tracing::error!(%session_id, error = %err, "Session task failed");
                SessionSummary {
                    session_id,
                    result: GameResult::Ongoing,
                    rounds: 0,
                    active: false,
                }
            }
        }
    }
}

pub fn spawn_session(controller: SessionController) -> SessionHandle {
    let session_id = controller.session_id();
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let span = tracing::info_span!("session", %session_id);
    let task = tokio::spawn(run(controller, rx).instrument(span));
    SessionHandle {
        session_id,
        commands: tx,
        task,
    }
}

async fn run(mut controller: SessionController, mut commands: mpsc::Receiver<Command>) -> SessionSummary {
    controller.open().await;

    // Fixed when a timed suspension starts; ignored commands do not move it.
    let mut armed: Option<(Suspension, Instant)> = None;

    while !controller.is_finished() && controller.is_active() {
        let next = match controller.deadline() {
            Some(limit) => {
                let suspension = controller.suspension();
                let deadline = match armed {
                    Some((armed_for, at)) if armed_for == suspension => at,
                    _ => {
                        let at = Instant::now() + limit;
                        armed = Some((suspension, at));
                        at
                    }
                };
                match tokio::time::timeout_at(deadline, commands.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        armed = None;
                        controller.on_deadline().await;
                        continue;
                    }
                }
            }
            None => {
                armed = None;
                commands.recv().await
            }
        };

        let Some(command) = next else {
            debug!("Command channel closed");
            break;
        };
        controller.handle_command(command).await;
    }

    let state = controller.state();
    info!(
        result = ?state.result,
        rounds = state.round(),
        active = controller.is_active(),
        "Session task ending"
    );
    SessionSummary {
        session_id: controller.session_id(),
        result: state.result,
        rounds: state.round(),
        active: controller.is_active(),
    }
}
