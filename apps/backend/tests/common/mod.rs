#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::Arc;
use std::time::Duration;

use nightfall_backend::ai::{DecisionProvider, ScriptedProvider};
use nightfall_backend::config::{GameConfig, SessionTimings};
use nightfall_backend::domain::{ParticipantId, Role};
use nightfall_backend::protocol::{ActionKind, ActionPrompt, Command, GameEvent, MemorySink};
use nightfall_backend::{SessionController, Suspension};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    nightfall_test_support::logging::init();
}

/// Seat 1 first. Two eliminators, then one of each special role, then bystanders.
pub const STANDARD_DECK: [Role; 7] = [
    Role::Eliminator,
    Role::Eliminator,
    Role::Investigator,
    Role::Protector,
    Role::Retaliator,
    Role::Bystander,
    Role::Bystander,
];

pub fn instant_config() -> GameConfig {
    GameConfig {
        timings: SessionTimings::instant(),
        ..GameConfig::default()
    }
}

/// A controller plus the sink it reports to.
pub struct Table {
    pub controller: SessionController,
    pub sink: Arc<MemorySink>,
}

impl Table {
    pub fn build(human_seat: ParticipantId, provider: Arc<dyn DecisionProvider>) -> Self {
        Self::build_with(human_seat, provider, instant_config(), Arc::new(MemorySink::new()))
    }

    pub fn build_with(
        human_seat: ParticipantId,
        provider: Arc<dyn DecisionProvider>,
        config: GameConfig,
        sink: Arc<MemorySink>,
    ) -> Self {
        let controller = SessionController::builder("Tester")
            .config(config)
            .seed(7)
            .human_seat(human_seat)
            .role_deck(STANDARD_DECK.to_vec())
            .provider(provider)
            .sink(sink.clone())
            .build()
            .expect("valid session");
        Self { controller, sink }
    }

    /// Opens the session, deals and confirms: the first night runs until the
    /// human has to act.
    pub async fn start(&mut self) {
        self.controller.open().await;
        self.send(Command::StartGame).await;
        assert_eq!(self.controller.suspension(), Suspension::AwaitingRoleConfirm);
        self.send(Command::ConfirmRole).await;
    }

    pub async fn send(&mut self, command: Command) {
        self.controller.handle_command(command).await;
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.sink.events()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.sink.kinds()
    }

    pub fn prompts(&self) -> Vec<ActionPrompt> {
        prompts(&self.events())
    }

    pub fn last_prompt(&self) -> Option<ActionPrompt> {
        self.prompts().pop()
    }
}

pub fn scripted(provider: ScriptedProvider) -> Arc<ScriptedProvider> {
    Arc::new(provider)
}

pub fn prompts(events: &[GameEvent]) -> Vec<ActionPrompt> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ActionRequired(prompt) => Some(prompt.clone()),
            _ => None,
        })
        .collect()
}

pub fn prompt_kinds(events: &[GameEvent]) -> Vec<ActionKind> {
    prompts(events).into_iter().map(|p| p.action).collect()
}

pub fn position(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> Option<usize> {
    events.iter().position(pred)
}

pub fn announcements(events: &[GameEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Announcement { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Upper bound for tests that wait on a collective timeout.
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(50);
