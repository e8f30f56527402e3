use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::Message;

/// Per-browser chat sessions held in memory.
///
/// Each session keeps the running message history so follow-up
/// questions can reference earlier turns. Callers sweep idle sessions
/// with `remove_expired` whenever they touch the store.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<Uuid, Session>,
    ttl: Duration,
}

#[derive(Debug)]
struct Session {
    messages: Vec<Message>,
    last_accessed: Instant,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Creates a fresh session and returns its identifier.
    pub fn create(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            Session {
                messages: Vec::new(),
                last_accessed: Instant::now(),
            },
        );
        id
    }

    /// Returns the message history for a session, refreshing its
    /// last-accessed time. Unknown ids yield `None`.
    pub fn history(&mut self, id: &Uuid) -> Option<&[Message]> {
        let session = self.sessions.get_mut(id)?;
        session.last_accessed = Instant::now();
        Some(&session.messages)
    }

    /// Appends a message to an existing session. Returns false when
    /// the session is unknown or already expired.
    pub fn append(&mut self, id: &Uuid, message: Message) -> bool {
        match self.sessions.get_mut(id) {
            Some(session) => {
                session.messages.push(message);
                session.last_accessed = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Drops every session idle longer than the configured TTL and
    /// returns how many were removed.
    pub fn remove_expired(&mut self) -> usize {
        let ttl = self.ttl;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.last_accessed.elapsed() < ttl);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        // One hour of inactivity before a chat history is dropped.
        Self::new(Duration::from_secs(3600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_session_with_empty_history() {
        let mut store = SessionStore::default();

        let id = store.create();

        assert_eq!(store.len(), 1);
        assert!(store.history(&id).unwrap().is_empty());
    }

    #[test]
    fn should_append_messages_in_order() {
        let mut store = SessionStore::default();
        let id = store.create();

        assert!(store.append(&id, Message::user("What is Rust?")));
        assert!(store.append(&id, Message::assistant("A systems language.")));

        let history = store.history(&id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "What is Rust?");
        assert_eq!(history[1].content, "A systems language.");
    }

    #[test]
    fn should_reject_append_for_unknown_session() {
        let mut store = SessionStore::default();

        let unknown = Uuid::new_v4();
        assert!(!store.append(&unknown, Message::user("hello")));
        assert!(store.history(&unknown).is_none());
    }

    #[test]
    fn should_expire_idle_sessions() {
        let mut store = SessionStore::new(Duration::from_secs(0));
        store.create();
        store.create();

        let removed = store.remove_expired();

        assert_eq!(removed, 2);
        assert!(store.is_empty());
    }

    #[test]
    fn should_keep_recently_accessed_sessions() {
        let mut store = SessionStore::new(Duration::from_secs(3600));
        store.create();

        let removed = store.remove_expired();

        assert_eq!(removed, 0);
        assert_eq!(store.len(), 1);
    }
}
