//! Night turns and dawn.

use tracing::{debug, info};

use super::{Flow, SessionController, Step, Suspension};
use crate::domain::{
    public_roster, roles, DeathCause, InvestigationRecord, ParticipantId, PendingRetaliation,
    Phase, RetaliationOrigin, Role,
};
use crate::protocol::{ActionKind, ActionPrompt, GameEvent};

fn turn_phase(role: Role) -> (Phase, Step) {
    match role {
        Role::Eliminator => (Phase::NightEliminatorTurn, Step::InvestigatorTurn),
        Role::Investigator => (Phase::NightInvestigatorTurn, Step::ProtectorTurn),
        _ => (Phase::NightProtectorTurn, Step::Dawn),
    }
}

fn turn_announcement(role: Role) -> &'static str {
    match role {
        Role::Eliminator => "The eliminators open their eyes and choose a target.",
        Role::Investigator => "The investigator opens their eyes and checks someone.",
        _ => "The protector opens their eyes.",
    }
}

impl SessionController {
    pub(super) async fn enter_night(&mut self) -> Flow {
        if let Some(flow) = self.check_outcome() {
            return flow;
        }
        let round = self.state.enter_night();
        info!(session_id = %self.state.session_id, round, "Night falls");
        self.emit(GameEvent::phase_change(Phase::Night, round)).await;
        self.announce(format!("Night {round} falls. Everyone closes their eyes."))
            .await;
        self.long_pause().await;
        Flow::Next(Step::EliminatorTurn)
    }

    /// The acting holder of a night role: the human when they hold it and are
    /// alive, otherwise the lowest-numbered alive holder.
    fn night_actor(&self, role: Role) -> Option<ParticipantId> {
        let holders = self.state.alive_with_role(role);
        let human = self.state.human_id();
        if holders.contains(&human) {
            Some(human)
        } else {
            holders.first().copied()
        }
    }

    pub(super) async fn night_turn(&mut self, role: Role) -> Flow {
        let (phase, next) = turn_phase(role);
        self.state.phase = phase;
        self.emit(GameEvent::phase_change(phase, self.state.round()))
            .await;
        self.announce(turn_announcement(role)).await;

        let Some(actor) = self.night_actor(role) else {
            debug!(session_id = %self.state.session_id, ?role, "No living holder, skipping turn");
            self.short_pause().await;
            return Flow::Next(next);
        };

        if self.state.is_human(actor) {
            let prompt = self.night_prompt(role, actor);
            self.emit(GameEvent::ActionRequired(prompt)).await;
            let suspension = match role {
                Role::Eliminator => Suspension::AwaitingEliminatorTarget { actor },
                Role::Investigator => Suspension::AwaitingInvestigatorTarget { actor },
                _ => Suspension::AwaitingProtectorDecision { actor },
            };
            return Flow::Suspend(suspension);
        }

        match role {
            Role::Eliminator => {
                let valid = roles::eliminator_targets(&self.state);
                if let Some(target) = self.decide_target(role, actor, &valid).await {
                    self.apply_elimination(actor, target);
                }
            }
            Role::Investigator => {
                let valid = roles::investigator_targets(&self.state, actor);
                if let Some(target) = self.decide_target(role, actor, &valid).await {
                    self.apply_investigation(actor, target).await;
                }
            }
            _ => {
                let save = roles::can_save(&self.state) && self.decide_protect(actor).await;
                let poison = if roles::can_poison(&self.state) {
                    let valid = roles::poison_targets(&self.state, actor);
                    self.decide_poison(actor, &valid).await
                } else {
                    None
                };
                self.apply_protector(actor, save, poison);
            }
        }
        self.short_pause().await;
        Flow::Next(next)
    }

    fn night_prompt(&self, role: Role, actor: ParticipantId) -> ActionPrompt {
        match role {
            Role::Eliminator => {
                let teammates = self
                    .state
                    .alive_with_role(Role::Eliminator)
                    .into_iter()
                    .filter(|id| *id != actor)
                    .collect();
                ActionPrompt::new(ActionKind::EliminatorTarget, "Choose tonight's target.")
                    .with_targets(roles::eliminator_targets(&self.state))
                    .with_teammates(teammates)
            }
            Role::Investigator => ActionPrompt::new(
                ActionKind::InvestigatorTarget,
                "Choose someone to investigate.",
            )
            .with_targets(roles::investigator_targets(&self.state, actor)),
            _ => {
                let can_poison = roles::can_poison(&self.state);
                let targets = if can_poison {
                    roles::poison_targets(&self.state, actor)
                } else {
                    Vec::new()
                };
                let mut prompt = ActionPrompt::new(
                    ActionKind::ProtectorAction,
                    "Decide whether to save tonight's target and whether to use your poison.",
                )
                .with_targets(targets);
                prompt.eliminator_target = self.state.night_action().and_then(|r| r.eliminator_target);
                prompt.can_save = Some(roles::can_save(&self.state));
                prompt.can_poison = Some(can_poison);
                prompt
            }
        }
    }

    pub(super) fn apply_elimination(&mut self, actor: ParticipantId, target: ParticipantId) -> bool {
        let applied = roles::eliminate(&mut self.state, target);
        debug!(session_id = %self.state.session_id, actor, target, applied, "Eliminator target");
        applied
    }

    pub(super) async fn apply_investigation(
        &mut self,
        actor: ParticipantId,
        target: ParticipantId,
    ) -> Option<bool> {
        let is_hostile = roles::investigate(&mut self.state, target)?;
        let round = self.state.round();
        self.state.log_investigation(InvestigationRecord {
            round,
            investigator_id: actor,
            target_id: target,
            is_hostile,
        });
        debug!(session_id = %self.state.session_id, actor, target, "Investigation recorded");
        if self.state.is_human(actor) {
            self.emit(GameEvent::InvestigationResult {
                round,
                target_id: target,
                is_hostile,
            })
            .await;
        }
        Some(is_hostile)
    }

    pub(super) fn apply_protector(
        &mut self,
        actor: ParticipantId,
        save: bool,
        poison: Option<ParticipantId>,
    ) {
        let saved = save && roles::protect(&mut self.state);
        let poisoned = poison.filter(|target| roles::poison(&mut self.state, *target));
        debug!(
            session_id = %self.state.session_id,
            actor,
            saved,
            ?poisoned,
            "Protector decision"
        );
    }

    pub(super) async fn dawn(&mut self) -> Flow {
        self.state.phase = Phase::DayAnnounce;
        let round = self.state.round();
        self.emit(GameEvent::phase_change(Phase::DayAnnounce, round))
            .await;

        let outcome = self.orchestrator.resolve_night(&mut self.state);
        info!(
            session_id = %self.state.session_id,
            round,
            deaths = outcome.deaths.len(),
            "Dawn"
        );

        if outcome.deaths.is_empty() {
            self.announce("The night was peaceful. Nobody died.").await;
        } else {
            for message in &outcome.messages {
                self.announce(message.clone()).await;
            }
        }
        self.emit(GameEvent::NightResult {
            deaths: outcome.deaths.clone(),
            messages: outcome.messages.clone(),
            participants: public_roster(&self.state),
        })
        .await;

        let retaliator = outcome.deaths.iter().find(|d| {
            d.cause != DeathCause::Toxin && self.state.role_of(d.participant_id) == Some(Role::Retaliator)
        });
        if let Some(death) = retaliator {
            self.state.pending_retaliation = Some(PendingRetaliation {
                retaliator_id: death.participant_id,
                origin: RetaliationOrigin::Night,
            });
            self.state.phase = Phase::RetaliationPending;
        }

        if round == 1 {
            self.statements
                .extend(outcome.deaths.iter().map(|d| d.participant_id));
        }
        self.after_statements = Step::StartDiscussion;

        if let Some(flow) = self.check_outcome() {
            return flow;
        }
        self.long_pause().await;
        if self.state.is_retaliation_pending() {
            Flow::Next(Step::Retaliation)
        } else {
            Flow::Next(Step::NextStatement)
        }
    }
}
