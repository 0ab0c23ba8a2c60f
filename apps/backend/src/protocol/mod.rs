//! Wire-level types shared by the session engine and its transports.

pub mod commands;
pub mod events;
pub mod sink;

pub use commands::Command;
pub use events::{ActionKind, ActionPrompt, GameEvent, RevealedRole};
pub use sink::{ChannelSink, EventSink, MemorySink, SinkError};
