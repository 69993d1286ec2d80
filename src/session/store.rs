use super::data::Session;
use crate::providers::llm::ChatTurn;
use chrono::Utc;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// In-memory store of active conversation sessions (session_id → session).
///
/// Cloning the store is cheap and shares the underlying map, so the HTTP
/// state and the orchestrator can hold the same sessions. All operations on
/// one session id serialize through the map lock; there is no eviction, so
/// memory grows with distinct session ids for the life of the process.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the session for `session_id`, creating it with empty history
    /// on first reference. Refreshes `last_accessed` either way. The returned
    /// session is a snapshot; writes go through [`update_history`].
    ///
    /// [`update_history`]: SessionStore::update_history
    pub async fn get_or_create(&self, session_id: &str) -> Session {
        let mut sessions = self.sessions.write().await;

        match sessions.entry(session_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let session = entry.get_mut();
                session.last_accessed = Utc::now();
                session.clone()
            }
            Entry::Vacant(entry) => {
                info!("creating new session: {}", session_id);
                entry.insert(Session::new(session_id)).clone()
            }
        }
    }

    /// Replaces the session's history wholesale and refreshes `last_accessed`.
    /// Does nothing for an unknown id; sessions are only created by access.
    pub async fn update_history(&self, session_id: &str, history: Vec<ChatTurn>) {
        let mut sessions = self.sessions.write().await;

        if let Some(session) = sessions.get_mut(session_id) {
            session.history = history;
            session.last_accessed = Utc::now();
            info!(
                "updated history for session {} ({} turns)",
                session_id,
                session.history.len()
            );
        }
    }

    /// Number of sessions currently resident.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
