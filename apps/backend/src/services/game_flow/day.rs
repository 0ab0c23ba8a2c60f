//! Final statements and the daytime discussion.

use tracing::debug;

use super::{Flow, SessionController, Step, Suspension};
use crate::domain::{ParticipantId, Phase};
use crate::protocol::{ActionKind, ActionPrompt, GameEvent};

impl SessionController {
    /// Appends to the speech log and broadcasts it. Blank text is dropped.
    pub(super) async fn publish_speech(&mut self, speaker: ParticipantId, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            debug!(session_id = %self.state.session_id, speaker, "Blank speech dropped");
            return;
        }
        let record = self.state.append_speech(speaker, text).clone();
        let speaker_name = self.state.name_of(speaker);
        self.emit(GameEvent::Speech {
            speaker_name,
            record,
        })
        .await;
    }

    pub(super) async fn next_statement(&mut self) -> Flow {
        let Some(participant) = self.statements.pop_front() else {
            let next = std::mem::replace(&mut self.after_statements, Step::StartDiscussion);
            return Flow::Next(next);
        };

        self.state.phase = Phase::FinalStatement;
        self.state.current_speaker = Some(participant);
        self.emit(GameEvent::phase_change(Phase::FinalStatement, self.state.round()))
            .await;
        let name = self.state.name_of(participant);
        self.announce(format!("{name} may leave a last statement."))
            .await;

        let time_limit_secs = self.config.timings.statement_timeout.as_secs();
        self.emit(GameEvent::SpeakerTurn {
            speaker_id: participant,
            speaker_name: name,
            time_limit_secs,
        })
        .await;

        if self.state.is_human(participant) {
            self.emit(GameEvent::ActionRequired(
                ActionPrompt::new(ActionKind::FinalStatement, "Leave your last words.")
                    .with_time_limit(time_limit_secs),
            ))
            .await;
            return Flow::Suspend(Suspension::AwaitingFinalStatement { participant });
        }

        self.emit(GameEvent::Thinking {
            participant_id: participant,
        })
        .await;
        let text = self.decide_speech(participant).await;
        self.publish_speech(participant, &text).await;
        self.short_pause().await;
        Flow::Next(Step::NextStatement)
    }

    pub(super) async fn finish_statement(&mut self, participant: ParticipantId, text: Option<&str>) -> Flow {
        match text {
            Some(text) => self.publish_speech(participant, text).await,
            None => {
                let name = self.state.name_of(participant);
                self.announce(format!("{name} left without a word.")).await;
            }
        }
        self.state.current_speaker = None;
        Flow::Next(Step::NextStatement)
    }

    pub(super) async fn start_discussion(&mut self) -> Flow {
        self.state.phase = Phase::DayDiscuss;
        self.emit(GameEvent::phase_change(Phase::DayDiscuss, self.state.round()))
            .await;
        self.announce("Discussion begins. Each living participant speaks in turn.")
            .await;
        match self.orchestrator.start_discussion(&mut self.state) {
            Some(_) => Flow::Next(Step::Speak),
            None => Flow::Next(Step::DiscussionEnd),
        }
    }

    pub(super) async fn speak(&mut self) -> Flow {
        let Some(speaker) = self.state.current_speaker else {
            return Flow::Next(Step::DiscussionEnd);
        };

        let time_limit_secs = self.config.speech_time_limit_secs;
        self.emit(GameEvent::SpeakerTurn {
            speaker_id: speaker,
            speaker_name: self.state.name_of(speaker),
            time_limit_secs,
        })
        .await;

        if self.state.is_human(speaker) {
            self.emit(GameEvent::ActionRequired(
                ActionPrompt::new(ActionKind::Speak, "It is your turn to speak.")
                    .with_time_limit(time_limit_secs),
            ))
            .await;
            return Flow::Suspend(Suspension::AwaitingSpeech { speaker });
        }

        self.emit(GameEvent::Thinking {
            participant_id: speaker,
        })
        .await;
        let text = self.decide_speech(speaker).await;
        self.publish_speech(speaker, &text).await;
        self.short_pause().await;
        self.advance_discussion()
    }

    pub(super) fn advance_discussion(&mut self) -> Flow {
        match self.orchestrator.advance_speaker(&mut self.state) {
            Some(_) => Flow::Next(Step::Speak),
            None => Flow::Next(Step::DiscussionEnd),
        }
    }

    pub(super) async fn discussion_end(&mut self) -> Flow {
        self.state.current_speaker = None;
        self.emit(GameEvent::ReadyToVote).await;
        if self.human_alive() {
            self.emit(GameEvent::ActionRequired(ActionPrompt::new(
                ActionKind::BeginVoting,
                "Discussion is over. Start the vote when you are ready.",
            )))
            .await;
            return Flow::Suspend(Suspension::AwaitingBeginVoting);
        }
        Flow::Next(Step::Vote)
    }
}
