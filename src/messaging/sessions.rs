//! # Live Session Registry
//!
//! Maps each recipient to the real-time sessions currently connected for it.
//! The transport layer registers a session on connect and keeps the returned
//! [`SessionHandle`] to forward pushed messages; it unregisters on disconnect.
//! A recipient may hold several sessions at once (several tabs or devices).
//!
//! The registry is an explicit object passed to the dispatcher, not ambient
//! global state. Sessions whose receiver was dropped without unregistering
//! are pruned on the next push.

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

/// One message pushed to a live session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMessage {
    pub event: String,
    pub payload: serde_json::Value,
}

/// Receiving side of one registered session
#[derive(Debug)]
pub struct SessionHandle {
    pub user: Uuid,
    pub session_id: Uuid,
    receiver: mpsc::UnboundedReceiver<SessionMessage>,
}

impl SessionHandle {
    pub async fn recv(&mut self) -> Option<SessionMessage> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<SessionMessage> {
        self.receiver.try_recv().ok()
    }
}

#[derive(Debug)]
struct SessionEntry {
    session_id: Uuid,
    sender: mpsc::UnboundedSender<SessionMessage>,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, Vec<SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user: Uuid) -> SessionHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let session_id = Uuid::new_v4();
        self.sessions
            .entry(user)
            .or_default()
            .push(SessionEntry { session_id, sender });
        debug!(user = %user, session_id = %session_id, "🔌 Session registered");
        SessionHandle {
            user,
            session_id,
            receiver,
        }
    }

    /// Returns whether the session was registered
    pub fn unregister(&self, user: Uuid, session_id: Uuid) -> bool {
        let mut removed = false;
        if let Some(mut entries) = self.sessions.get_mut(&user) {
            let before = entries.len();
            entries.retain(|entry| entry.session_id != session_id);
            removed = entries.len() < before;
        }
        self.sessions.remove_if(&user, |_, entries| entries.is_empty());
        if removed {
            debug!(user = %user, session_id = %session_id, "🔌 Session unregistered");
        }
        removed
    }

    /// Push to every live session of `user`; returns how many received it
    pub fn push(&self, user: Uuid, event: &str, payload: serde_json::Value) -> usize {
        let mut delivered = 0;
        if let Some(mut entries) = self.sessions.get_mut(&user) {
            entries.retain(|entry| {
                let message = SessionMessage {
                    event: event.to_string(),
                    payload: payload.clone(),
                };
                match entry.sender.send(message) {
                    Ok(()) => {
                        delivered += 1;
                        true
                    }
                    Err(_) => {
                        trace!(user = %user, session_id = %entry.session_id, "Pruning closed session");
                        false
                    }
                }
            });
        }
        self.sessions.remove_if(&user, |_, entries| entries.is_empty());
        delivered
    }

    pub fn session_count(&self, user: Uuid) -> usize {
        self.sessions.get(&user).map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn connected_users(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_reaches_every_session() {
        let registry = SessionRegistry::new();
        let user = Uuid::new_v4();
        let mut first = registry.register(user);
        let mut second = registry.register(user);

        let delivered = registry.push(user, "notification:receive", json!({"n": 1}));
        assert_eq!(delivered, 2);
        assert_eq!(first.try_recv().unwrap().payload, json!({"n": 1}));
        assert_eq!(second.try_recv().unwrap().event, "notification:receive");
    }

    #[test]
    fn test_dropped_sessions_are_pruned() {
        let registry = SessionRegistry::new();
        let user = Uuid::new_v4();
        let kept = registry.register(user);
        drop(registry.register(user));

        assert_eq!(registry.session_count(user), 2);
        assert_eq!(registry.push(user, "e", json!(null)), 1);
        assert_eq!(registry.session_count(user), 1);

        assert!(registry.unregister(user, kept.session_id));
        assert!(!registry.unregister(user, kept.session_id));
        assert_eq!(registry.connected_users(), 0);
    }

    #[test]
    fn test_push_to_offline_user() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.push(Uuid::new_v4(), "e", json!({})), 0);
    }
}
