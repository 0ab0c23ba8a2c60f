use tracing::{debug, error, info, warn};

use super::{Flow, SessionController, Step, Suspension};
use crate::domain::{public_roster, Faction, GameResult, Phase, Role};
use crate::protocol::{ActionKind, ActionPrompt, GameEvent, RevealedRole};

/// Result recorded when nobody is left alive to win.
const EMPTY_TABLE_RESULT: GameResult = GameResult::GoodWin;

impl SessionController {
    /// Announces the session and waits for the start command.
    pub async fn open(&mut self) {
        let event = GameEvent::GameCreated {
            session_id: self.state.session_id,
            human_id: self.state.human_id(),
            participants: public_roster(&self.state),
        };
        self.emit(event).await;
        self.suspension = Suspension::AwaitingStart;
        info!(
            session_id = %self.state.session_id,
            participants = self.state.participants().len(),
            human_id = self.state.human_id(),
            provider = self.provider.name(),
            "Session opened"
        );
    }

    /// Runs steps until the flow suspends.
    pub(super) async fn drive(&mut self, mut flow: Flow) {
        self.suspension = Suspension::Running;
        loop {
            match flow {
                Flow::Next(step) => {
                    debug!(session_id = %self.state.session_id, ?step, "Step");
                    flow = self.run_step(step).await;
                }
                Flow::Suspend(suspension) => {
                    debug!(session_id = %self.state.session_id, ?suspension, "Suspended");
                    self.suspension = suspension;
                    return;
                }
            }
        }
    }

    async fn run_step(&mut self, step: Step) -> Flow {
        match step {
            Step::EnterNight => self.enter_night().await,
            Step::EliminatorTurn => self.night_turn(Role::Eliminator).await,
            Step::InvestigatorTurn => self.night_turn(Role::Investigator).await,
            Step::ProtectorTurn => self.night_turn(Role::Protector).await,
            Step::Dawn => self.dawn().await,
            Step::NextStatement => self.next_statement().await,
            Step::StartDiscussion => self.start_discussion().await,
            Step::Speak => self.speak().await,
            Step::DiscussionEnd => self.discussion_end().await,
            Step::Vote => self.collect_votes().await,
            Step::ResolveVote => self.resolve_vote().await,
            Step::Retaliation => self.retaliation().await,
            Step::AwaitEnterNight => self.await_enter_night().await,
            Step::GameOver => self.game_over().await,
        }
    }

    /// Deals roles and shows the human theirs.
    pub(super) async fn start_game(&mut self) -> Option<Flow> {
        let dealt = match &self.role_deck {
            Some(deck) => self.orchestrator.assign_fixed(&mut self.state, deck),
            None => self.orchestrator.assign_roles(&mut self.state, &mut self.rng),
        };
        if let Err(err) = dealt {
            error!(session_id = %self.state.session_id, error = %err, "Role deal failed");
            return None;
        }

        let human = self.state.human_id();
        if let Some(role) = self.state.role_of(human) {
            let teammates = if role.faction() == Faction::Hostile {
                self.state
                    .hostile_ids()
                    .into_iter()
                    .filter(|id| *id != human)
                    .collect()
            } else {
                Vec::new()
            };
            self.emit(GameEvent::RoleAssigned {
                participant_id: human,
                role,
                role_name: role.display_name().to_string(),
                description: role.description().to_string(),
                teammates,
            })
            .await;
        }

        self.emit(GameEvent::GameStarted {
            participants: public_roster(&self.state),
        })
        .await;
        self.emit(GameEvent::ActionRequired(ActionPrompt::new(
            ActionKind::ConfirmRole,
            "Check your role, then confirm to begin the first night.",
        )))
        .await;
        Some(Flow::Suspend(Suspension::AwaitingRoleConfirm))
    }

    /// Returns the game-over continuation once a faction has won.
    ///
    /// A table with nobody alive ends immediately.
    pub(super) fn check_outcome(&mut self) -> Option<Flow> {
        if self.state.alive_count() == 0 {
            warn!(session_id = %self.state.session_id, "Nobody left alive, forcing game over");
            self.state.result = EMPTY_TABLE_RESULT;
            return Some(Flow::Next(Step::GameOver));
        }
        match self.orchestrator.evaluate_win(&self.state) {
            GameResult::Ongoing => None,
            result => {
                self.state.result = result;
                Some(Flow::Next(Step::GameOver))
            }
        }
    }

    async fn game_over(&mut self) -> Flow {
        self.state.phase = Phase::GameOver;
        self.state.current_speaker = None;
        self.state.pending_retaliation = None;
        self.statements.clear();
        self.emit(GameEvent::phase_change(Phase::GameOver, self.state.round()))
            .await;

        let message = match self.state.result {
            GameResult::HostileWin => "The eliminators have taken the town. Hostile faction wins.",
            _ => "Every eliminator has been found. Good faction wins.",
        };
        self.announce(message).await;

        let roles = self
            .state
            .participants()
            .iter()
            .filter_map(|p| {
                p.role().map(|role| RevealedRole {
                    id: p.id,
                    name: p.name.clone(),
                    role,
                    status: p.status(),
                })
            })
            .collect();
        self.emit(GameEvent::GameOver {
            result: self.state.result,
            roles,
        })
        .await;

        info!(
            session_id = %self.state.session_id,
            result = ?self.state.result,
            rounds = self.state.round(),
            "Game over"
        );
        Flow::Suspend(Suspension::Finished)
    }

    async fn await_enter_night(&mut self) -> Flow {
        self.emit(GameEvent::ActionRequired(ActionPrompt::new(
            ActionKind::EnterNight,
            "Continue when you are ready for night to fall.",
        )))
        .await;
        Flow::Suspend(Suspension::AwaitingEnterNight)
    }
}
