//! Event sinks: where a session's notifications go.

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::protocol::events::GameEvent;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SinkError {
    /// The remote party is gone; nothing will be delivered again.
    #[error("event sink closed")]
    Closed,
    #[error("event delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, event: &GameEvent) -> Result<(), SinkError>;
}

/// Forwards events to an unbounded channel (one per connection).
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<GameEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<GameEvent>) -> Self {
        Self { tx }
    }

    pub fn pair() -> (Self, mpsc::UnboundedReceiver<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn deliver(&self, event: &GameEvent) -> Result<(), SinkError> {
        self.tx.send(event.clone()).map_err(|_| SinkError::Closed)
    }
}

/// Records events in memory. Optionally starts failing after `n` deliveries.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<GameEvent>>,
    fail_after: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(n: usize) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_after: Some(n),
        }
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(GameEvent::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drains what has been recorded so far.
    pub fn take(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn deliver(&self, event: &GameEvent) -> Result<(), SinkError> {
        let mut events = self.events.lock();
        if self.fail_after.is_some_and(|n| events.len() >= n) {
            return Err(SinkError::Closed);
        }
        events.push(event.clone());
        Ok(())
    }
}
