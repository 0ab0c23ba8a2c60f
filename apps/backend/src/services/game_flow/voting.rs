//! Vote collection and resolution.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use super::ai_coordinator::with_retries;
use super::{Flow, SessionController, Step, Suspension};
use crate::domain::{roles, ParticipantId, PendingRetaliation, Phase, RetaliationOrigin, Role};
use crate::protocol::{ActionKind, ActionPrompt, GameEvent};
use crate::services::round_orchestrator::TallyVerdict;

impl SessionController {
    /// Records a ballot and broadcasts it. Ballots from or against the dead are dropped.
    pub(super) async fn cast_vote(&mut self, voter: ParticipantId, target: ParticipantId) -> bool {
        if !self.state.record_vote(voter, target) {
            return false;
        }
        self.emit(GameEvent::VoteCast {
            voter_id: voter,
            target_id: target,
        })
        .await;
        true
    }

    /// Opens the vote, prompts the human and gathers every autonomous ballot
    /// concurrently under one collective timeout.
    pub(super) async fn collect_votes(&mut self) -> Flow {
        self.state.phase = Phase::DayVote;
        self.state.clear_votes();
        self.emit(GameEvent::phase_change(Phase::DayVote, self.state.round()))
            .await;
        self.emit(GameEvent::VoteReset).await;

        let human = self.state.human_id();
        let human_votes = self.human_alive();
        if human_votes {
            self.emit(GameEvent::ActionRequired(
                ActionPrompt::new(ActionKind::Vote, "Vote for the participant to eliminate.")
                    .with_targets(roles::vote_targets(&self.state, human)),
            ))
            .await;
        }

        let requests: Vec<_> = self
            .state
            .alive_ids()
            .into_iter()
            .filter(|id| *id != human)
            .filter_map(|id| {
                let view = self.view_of(id)?;
                Some((id, view, roles::vote_targets(&self.state, id)))
            })
            .collect();

        let provider = Arc::clone(&self.provider);
        let attempts = self.config.decision_attempts();
        let deadline = Instant::now() + self.config.timings.vote_timeout;

        let mut pending: FuturesUnordered<_> = requests
            .iter()
            .map(|(voter, view, valid)| {
                let provider = provider.as_ref();
                async move {
                    let choice = with_retries(
                        provider,
                        attempts,
                        "vote",
                        || provider.produce_vote(view, valid),
                        |target| valid.contains(target),
                    )
                    .await;
                    (*voter, choice)
                }
            })
            .collect();

        loop {
            match timeout_at(deadline, pending.next()).await {
                Ok(Some((voter, Some(target)))) => {
                    self.cast_vote(voter, target).await;
                }
                // Failed answers are filled in below.
                Ok(Some((_, None))) => {}
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        session_id = %self.state.session_id,
                        outstanding = pending.len(),
                        "Vote collection timed out"
                    );
                    break;
                }
            }
        }
        drop(pending);

        for (voter, _, valid) in &requests {
            if self.state.has_voted(*voter) {
                continue;
            }
            if let Some(target) = self.random_choice(valid) {
                self.cast_vote(*voter, target).await;
            }
        }

        if human_votes && !self.state.has_voted(human) {
            return Flow::Suspend(Suspension::AwaitingVote { voter: human });
        }
        Flow::Next(Step::ResolveVote)
    }

    pub(super) async fn resolve_vote(&mut self) -> Flow {
        let outcome = self.orchestrator.tally_votes(&mut self.state);
        info!(
            session_id = %self.state.session_id,
            round = self.state.round(),
            verdict = ?outcome.verdict,
            "Vote resolved"
        );
        self.emit(GameEvent::VoteResult {
            tallies: outcome.tallies.clone(),
            ballots: outcome.ballots.clone(),
            executed_id: outcome.executed(),
            is_tie: outcome.is_tie(),
        })
        .await;

        let executed = match outcome.verdict {
            TallyVerdict::Executed(id) => id,
            TallyVerdict::Tie(leaders) => {
                let names: Vec<String> = leaders.iter().map(|id| self.state.name_of(*id)).collect();
                self.announce(format!(
                    "The vote is tied between {}. Nobody is eliminated.",
                    names.join(" and ")
                ))
                .await;
                self.long_pause().await;
                return Flow::Next(Step::EnterNight);
            }
            TallyVerdict::NoVotes => {
                self.announce("No votes were cast. Nobody is eliminated.")
                    .await;
                self.long_pause().await;
                return Flow::Next(Step::EnterNight);
            }
        };

        let name = self.state.name_of(executed);
        self.announce(format!("{name} has been voted out.")).await;

        if self.state.role_of(executed) == Some(Role::Retaliator) {
            self.state.pending_retaliation = Some(PendingRetaliation {
                retaliator_id: executed,
                origin: RetaliationOrigin::Vote,
            });
            self.state.phase = Phase::RetaliationPending;
        }

        if let Some(flow) = self.check_outcome() {
            return flow;
        }
        self.long_pause().await;
        if self.state.is_retaliation_pending() {
            return Flow::Next(Step::Retaliation);
        }
        self.statements.push_back(executed);
        self.after_statements = Step::AwaitEnterNight;
        Flow::Next(Step::NextStatement)
    }

    pub(super) async fn human_vote(&mut self, voter: ParticipantId, target: ParticipantId) -> Option<Flow> {
        if !roles::vote_targets(&self.state, voter).contains(&target) {
            warn!(session_id = %self.state.session_id, voter, target, "Invalid vote target ignored");
            return None;
        }
        self.cast_vote(voter, target).await;
        self.emit(GameEvent::ActionRequired(ActionPrompt::new(
            ActionKind::Wait,
            "Your vote is in. Waiting for the result.",
        )))
        .await;
        Some(Flow::Next(Step::ResolveVote))
    }
}
