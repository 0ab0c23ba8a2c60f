//! Inbound commands from the human participant.

use tracing::{debug, info, warn};

use super::{Flow, SessionController, Step, Suspension};
use crate::domain::{roles, ParticipantId};
use crate::protocol::Command;

impl SessionController {
    /// Resumes the session if `command` matches what it is waiting for.
    ///
    /// Mismatched commands and invalid targets leave the session exactly as it was.
    pub async fn handle_command(&mut self, command: Command) {
        let current = self.suspension;
        let flow = match (current, command) {
            (Suspension::AwaitingStart, Command::StartGame) => self.start_game().await,
            (Suspension::AwaitingRoleConfirm, Command::ConfirmRole) => {
                Some(Flow::Next(Step::EnterNight))
            }
            (Suspension::AwaitingEliminatorTarget { actor }, Command::EliminatorTarget { target_id }) => {
                self.human_elimination(actor, target_id)
            }
            (
                Suspension::AwaitingInvestigatorTarget { actor },
                Command::InvestigatorTarget { target_id },
            ) => self.human_investigation(actor, target_id).await,
            (
                Suspension::AwaitingProtectorDecision { actor },
                Command::ProtectorAction {
                    save,
                    poison_target,
                },
            ) => self.human_protector(actor, save, poison_target),
            (Suspension::AwaitingSpeech { speaker }, Command::Speak { content }) => {
                self.publish_speech(speaker, &content).await;
                Some(self.advance_discussion())
            }
            (Suspension::AwaitingFinalStatement { participant }, Command::FinalStatement { content }) => {
                Some(self.finish_statement(participant, Some(&content)).await)
            }
            (Suspension::AwaitingBeginVoting, Command::BeginVoting) => Some(Flow::Next(Step::Vote)),
            (Suspension::AwaitingVote { voter }, Command::Vote { target_id }) => {
                self.human_vote(voter, target_id).await
            }
            (
                Suspension::AwaitingRetaliationTarget { retaliator },
                Command::RetaliationTarget { target_id },
            ) => self.human_retaliation(retaliator, target_id).await,
            (Suspension::AwaitingEnterNight, Command::EnterNight) => {
                Some(Flow::Next(Step::EnterNight))
            }
            (current, command) => {
                debug!(
                    session_id = %self.state.session_id,
                    expected = ?current,
                    received = command.name(),
                    "Command does not match the current suspension, ignoring"
                );
                None
            }
        };

        if let Some(flow) = flow {
            self.drive(flow).await;
        }
    }

    /// Applies the timeout of the current suspension, if it has one.
    pub async fn on_deadline(&mut self) {
        if let Suspension::AwaitingFinalStatement { participant } = self.suspension {
            info!(session_id = %self.state.session_id, participant, "Final statement timed out");
            let flow = self.finish_statement(participant, None).await;
            self.drive(flow).await;
        }
    }

    fn human_elimination(&mut self, actor: ParticipantId, target: ParticipantId) -> Option<Flow> {
        if !roles::eliminator_targets(&self.state).contains(&target) || !self.apply_elimination(actor, target) {
            warn!(session_id = %self.state.session_id, actor, target, "Invalid eliminator target ignored");
            return None;
        }
        Some(Flow::Next(Step::InvestigatorTurn))
    }

    async fn human_investigation(&mut self, actor: ParticipantId, target: ParticipantId) -> Option<Flow> {
        if !roles::investigator_targets(&self.state, actor).contains(&target) {
            warn!(session_id = %self.state.session_id, actor, target, "Invalid investigation target ignored");
            return None;
        }
        self.apply_investigation(actor, target).await?;
        Some(Flow::Next(Step::ProtectorTurn))
    }

    fn human_protector(
        &mut self,
        actor: ParticipantId,
        save: bool,
        poison: Option<ParticipantId>,
    ) -> Option<Flow> {
        if save && !roles::can_save(&self.state) {
            warn!(session_id = %self.state.session_id, actor, "Save requested without a charge or target, ignoring");
            return None;
        }
        if let Some(target) = poison {
            if !roles::can_poison(&self.state) || !roles::poison_targets(&self.state, actor).contains(&target) {
                warn!(session_id = %self.state.session_id, actor, target, "Invalid poison target ignored");
                return None;
            }
        }
        self.apply_protector(actor, save, poison);
        Some(Flow::Next(Step::Dawn))
    }
}
