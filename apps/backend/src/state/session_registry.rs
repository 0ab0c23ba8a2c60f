use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::Command;

/// Live sessions this process is running.
///
/// Only weak senders are kept: a session ends when its connection drops its
/// sender, whether or not it is still registered here.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, mpsc::WeakSender<Command>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn register(&self, session_id: Uuid, commands: &mpsc::Sender<Command>) {
        self.sessions.insert(session_id, commands.downgrade());
    }

    /// Removes the session and any other entry whose command channel has no owner left.
    pub fn unregister(&self, session_id: Uuid) {
        self.sessions.remove(&session_id);
        self.sessions.retain(|_, tx| tx.upgrade().is_some());
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregister_also_drops_abandoned_sessions() {
        let registry = SessionRegistry::new();
        let (live_tx, _live_rx) = mpsc::channel(1);
        let (dead_tx, _dead_rx) = mpsc::channel(1);
        let (done_tx, _done_rx) = mpsc::channel(1);

        let live = Uuid::new_v4();
        let done = Uuid::new_v4();
        registry.register(live, &live_tx);
        registry.register(Uuid::new_v4(), &dead_tx);
        registry.register(done, &done_tx);
        drop(dead_tx);
        assert_eq!(registry.len(), 3);

        registry.unregister(done);
        assert_eq!(registry.len(), 1);

        registry.unregister(live);
        assert!(registry.is_empty());
    }

    #[test]
    fn len_does_not_prune() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = mpsc::channel(1);
        registry.register(Uuid::new_v4(), &tx);
        drop(tx);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.len(), 1);
    }
}
