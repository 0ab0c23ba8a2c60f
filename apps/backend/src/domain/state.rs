use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::participant::{DeathCause, DeathRecord, Participant, ParticipantId, Role};

/// Control phases of a session.
///
/// This is the state machine's notion of "where are we"; user-facing text
/// comes from [`Phase::label`] and does not always map one-to-one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Created, roles not dealt yet.
    Waiting,
    Night,
    NightEliminatorTurn,
    NightInvestigatorTurn,
    NightProtectorTurn,
    /// Night resolution and death report.
    DayAnnounce,
    FinalStatement,
    DayDiscuss,
    DayVote,
    /// An eliminated Retaliator has not taken their shot yet.
    RetaliationPending,
    GameOver,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Night => "night",
            Phase::NightEliminatorTurn => "eliminators' turn",
            Phase::NightInvestigatorTurn => "investigator's turn",
            Phase::NightProtectorTurn => "protector's turn",
            Phase::DayAnnounce => "dawn",
            Phase::FinalStatement => "last statement",
            Phase::DayDiscuss => "discussion",
            Phase::DayVote => "vote",
            Phase::RetaliationPending => "retaliation",
            Phase::GameOver => "game over",
        }
    }

    pub fn is_night(self) -> bool {
        matches!(
            self,
            Phase::Night
                | Phase::NightEliminatorTurn
                | Phase::NightInvestigatorTurn
                | Phase::NightProtectorTurn
        )
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Ongoing,
    GoodWin,
    HostileWin,
}

/// One line of the public speech log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRecord {
    pub speaker_id: ParticipantId,
    pub text: String,
    pub round: u32,
    pub phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    pub target_id: ParticipantId,
    pub is_hostile: bool,
}

/// Intent collected during one night. Created on night entry, consumed at dawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightActionRecord {
    pub eliminator_target: Option<ParticipantId>,
    pub investigation: Option<Investigation>,
    pub protector_save: bool,
    pub poison_target: Option<ParticipantId>,
}

/// Single-use protector abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charges {
    pub protect: u8,
    pub poison: u8,
}

impl Default for Charges {
    fn default() -> Self {
        Self {
            protect: 1,
            poison: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationRecord {
    pub round: u32,
    pub investigator_id: ParticipantId,
    pub target_id: ParticipantId,
    pub is_hostile: bool,
}

/// How the pending Retaliator died; decides where play resumes after the shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetaliationOrigin {
    /// Died at night: the day continues with discussion.
    Night,
    /// Executed by vote: the next night follows.
    Vote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRetaliation {
    pub retaliator_id: ParticipantId,
    pub origin: RetaliationOrigin,
}

/// Shared session state. Mutated only by the session controller and the
/// round orchestrator; the rule set applies one atomic change per call.
#[derive(Debug, Clone)]
pub struct GameState {
    pub session_id: Uuid,
    pub phase: Phase,
    /// Whoever holds the floor during discussion.
    pub current_speaker: Option<ParticipantId>,
    pub charges: Charges,
    pub result: GameResult,
    pub pending_retaliation: Option<PendingRetaliation>,
    participants: Vec<Participant>,
    human_id: ParticipantId,
    round: u32,
    speech_log: Vec<SpeechRecord>,
    night_action: Option<NightActionRecord>,
    votes: BTreeMap<ParticipantId, ParticipantId>,
    investigations: Vec<InvestigationRecord>,
}

impl GameState {
    /// Builds the fixed participant list `1..=count`. The human sits at `human_id`;
    /// everyone else is named after their seat.
    pub fn new(
        session_id: Uuid,
        count: u8,
        human_id: ParticipantId,
        human_name: &str,
    ) -> Result<Self, DomainError> {
        if count == 0 {
            return Err(DomainError::Validation("no participants".into()));
        }
        if human_id == 0 || human_id > count {
            return Err(DomainError::UnknownParticipant(human_id));
        }

        let participants = (1..=count)
            .map(|id| {
                if id == human_id {
                    Participant::new(id, human_name, true)
                } else {
                    Participant::new(id, format!("Player {id}"), false)
                }
            })
            .collect();

        Ok(Self {
            session_id,
            phase: Phase::Waiting,
            current_speaker: None,
            charges: Charges::default(),
            result: GameResult::Ongoing,
            pending_retaliation: None,
            participants,
            human_id,
            round: 0,
            speech_log: Vec::new(),
            night_action: None,
            votes: BTreeMap::new(),
            investigations: Vec::new(),
        })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn name_of(&self, id: ParticipantId) -> String {
        self.participant(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Player {id}"))
    }

    pub fn human_id(&self) -> ParticipantId {
        self.human_id
    }

    pub fn human(&self) -> Option<&Participant> {
        self.participant(self.human_id)
    }

    pub fn is_human(&self, id: ParticipantId) -> bool {
        id == self.human_id
    }

    pub fn is_alive(&self, id: ParticipantId) -> bool {
        self.participant(id).is_some_and(Participant::is_alive)
    }

    pub fn role_of(&self, id: ParticipantId) -> Option<Role> {
        self.participant(id).and_then(Participant::role)
    }

    pub fn alive(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_alive())
    }

    pub fn alive_ids(&self) -> Vec<ParticipantId> {
        self.alive().map(|p| p.id).collect()
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Alive holders of `role`, in seat order.
    pub fn alive_with_role(&self, role: Role) -> Vec<ParticipantId> {
        self.alive().filter(|p| p.has_role(role)).map(|p| p.id).collect()
    }

    /// Every hostile participant, alive or not.
    pub fn hostile_ids(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|p| p.is_hostile())
            .map(|p| p.id)
            .collect()
    }

    pub fn roles_assigned(&self) -> bool {
        self.participants.iter().all(|p| p.role().is_some())
    }

    /// Deals `deck[i]` to the i-th participant. Fails without side effects if any
    /// participant already holds a role or the deck length is wrong.
    pub fn assign_roles(&mut self, deck: &[Role]) -> Result<(), DomainError> {
        if deck.len() != self.participants.len() {
            return Err(DomainError::DeckMismatch {
                deck: deck.len(),
                participants: self.participants.len(),
            });
        }
        if let Some(p) = self.participants.iter().find(|p| p.role().is_some()) {
            return Err(DomainError::RoleAlreadyAssigned(p.id));
        }
        for (participant, role) in self.participants.iter_mut().zip(deck) {
            participant.assign_role(*role)?;
        }
        Ok(())
    }

    /// Formally removes a participant. `None` if unknown or already out.
    pub fn eliminate(&mut self, id: ParticipantId, cause: DeathCause) -> Option<DeathRecord> {
        let participant = self.participants.iter_mut().find(|p| p.id == id)?;
        if !participant.eliminate(cause) {
            return None;
        }
        // A dead voter never keeps a ballot.
        self.votes.remove(&id);
        Some(DeathRecord {
            participant_id: id,
            cause,
        })
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// The only place the round counter moves. Opens a fresh night record.
    pub fn enter_night(&mut self) -> u32 {
        self.round += 1;
        self.phase = Phase::Night;
        self.current_speaker = None;
        self.votes.clear();
        self.night_action = Some(NightActionRecord::default());
        self.round
    }

    pub fn night_action(&self) -> Option<&NightActionRecord> {
        self.night_action.as_ref()
    }

    pub(crate) fn night_action_mut(&mut self) -> Option<&mut NightActionRecord> {
        self.night_action.as_mut()
    }

    pub(crate) fn take_night_action(&mut self) -> Option<NightActionRecord> {
        self.night_action.take()
    }

    pub fn speeches(&self) -> &[SpeechRecord] {
        &self.speech_log
    }

    /// Appends to the log, stamped with the current round and phase.
    pub fn append_speech(&mut self, speaker_id: ParticipantId, text: impl Into<String>) -> &SpeechRecord {
        self.speech_log.push(SpeechRecord {
            speaker_id,
            text: text.into(),
            round: self.round,
            phase: self.phase,
        });
        &self.speech_log[self.speech_log.len() - 1]
    }

    pub fn votes(&self) -> &BTreeMap<ParticipantId, ParticipantId> {
        &self.votes
    }

    pub fn has_voted(&self, voter: ParticipantId) -> bool {
        self.votes.contains_key(&voter)
    }

    /// Records a ballot. Both voter and target must be alive.
    pub fn record_vote(&mut self, voter: ParticipantId, target: ParticipantId) -> bool {
        if !self.is_alive(voter) || !self.is_alive(target) {
            return false;
        }
        self.votes.insert(voter, target);
        true
    }

    pub fn clear_votes(&mut self) {
        self.votes.clear();
    }

    pub fn investigations(&self) -> &[InvestigationRecord] {
        &self.investigations
    }

    pub(crate) fn log_investigation(&mut self, record: InvestigationRecord) {
        self.investigations.push(record);
    }

    pub fn is_retaliation_pending(&self) -> bool {
        self.pending_retaliation.is_some()
    }
}
