use serde::{Deserialize, Serialize};

use crate::protocol::Command;

/// Messages a client sends: `{"type": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMsg {
    CreateGame {
        #[serde(default)]
        player_name: Option<String>,
    },
    StartGame,
    /// A session command, itself tagged by `action`.
    Action(Command),
    Ping,
}

/// Transport-level replies. Session output is sent as bare events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMsg {
    Pong,
    Error { code: ErrorCode, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    NoSession,
    SessionExists,
    SessionClosed,
    Busy,
    InvalidConfig,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::NoSession => "no_session",
            ErrorCode::SessionExists => "session_exists",
            ErrorCode::SessionClosed => "session_closed",
            ErrorCode::Busy => "busy",
            ErrorCode::InvalidConfig => "invalid_config",
        }
    }
}
