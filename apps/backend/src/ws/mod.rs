//! WebSocket transport: one connection drives at most one live session.

pub mod protocol;
pub mod session;
