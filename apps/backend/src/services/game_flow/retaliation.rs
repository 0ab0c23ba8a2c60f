use tracing::{info, warn};

use super::{Flow, SessionController, Step, Suspension};
use crate::domain::{roles, ParticipantId, Phase, RetaliationOrigin, Role};
use crate::protocol::{ActionKind, ActionPrompt, GameEvent};

impl SessionController {
    pub(super) async fn retaliation(&mut self) -> Flow {
        let Some(pending) = self.state.pending_retaliation else {
            warn!(session_id = %self.state.session_id, "Retaliation step without a pending shot");
            return Flow::Next(Step::EnterNight);
        };
        let retaliator = pending.retaliator_id;

        self.state.phase = Phase::RetaliationPending;
        self.emit(GameEvent::phase_change(Phase::RetaliationPending, self.state.round()))
            .await;
        let name = self.state.name_of(retaliator);
        self.announce(format!(
            "{name} was the Retaliator and may take one participant with them."
        ))
        .await;

        let valid = roles::retaliation_targets(&self.state, retaliator);
        if self.state.is_human(retaliator) {
            self.emit(GameEvent::ActionRequired(
                ActionPrompt::new(
                    ActionKind::RetaliationTarget,
                    "Choose someone to take with you, or pass.",
                )
                .with_targets(valid),
            ))
            .await;
            return Flow::Suspend(Suspension::AwaitingRetaliationTarget { retaliator });
        }

        let target = self.decide_target(Role::Retaliator, retaliator, &valid).await;
        self.finish_retaliation(retaliator, target).await
    }

    /// Applies the shot (if any), clears the pending marker and picks where play resumes.
    pub(super) async fn finish_retaliation(
        &mut self,
        retaliator: ParticipantId,
        target: Option<ParticipantId>,
    ) -> Flow {
        let Some(pending) = self.state.pending_retaliation.take() else {
            return Flow::Next(Step::EnterNight);
        };

        let hit = target.filter(|t| roles::retaliate(&mut self.state, retaliator, *t));
        info!(
            session_id = %self.state.session_id,
            retaliator,
            target = ?hit,
            "Retaliation resolved"
        );
        self.emit(GameEvent::RetaliationResult {
            retaliator_id: retaliator,
            target_id: hit,
        })
        .await;
        let message = match hit {
            Some(target) => format!(
                "{} took {} down with them.",
                self.state.name_of(retaliator),
                self.state.name_of(target)
            ),
            None => format!("{} held their fire.", self.state.name_of(retaliator)),
        };
        self.announce(message).await;

        if let Some(flow) = self.check_outcome() {
            return flow;
        }
        self.long_pause().await;
        match pending.origin {
            RetaliationOrigin::Vote => Flow::Next(Step::EnterNight),
            RetaliationOrigin::Night => Flow::Next(Step::NextStatement),
        }
    }

    pub(super) async fn human_retaliation(
        &mut self,
        retaliator: ParticipantId,
        target: Option<ParticipantId>,
    ) -> Option<Flow> {
        if let Some(target) = target {
            if !roles::retaliation_targets(&self.state, retaliator).contains(&target) {
                warn!(
                    session_id = %self.state.session_id,
                    retaliator,
                    target,
                    "Invalid retaliation target ignored"
                );
                return None;
            }
        }
        Some(self.finish_retaliation(retaliator, target).await)
    }
}
