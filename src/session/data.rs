use crate::providers::llm::ChatTurn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ongoing conversation's in-memory state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque caller-supplied identifier
    pub session_id: String,

    /// Conversation history in the reply generator's turn format. Always the
    /// most recent history returned by the generator for this session; never
    /// independently mutated.
    pub history: Vec<ChatTurn>,

    /// When the session was first referenced
    pub created_at: DateTime<Utc>,

    /// Refreshed on every access
    pub last_accessed: DateTime<Utc>,
}

impl Session {
    pub(super) fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            history: Vec::new(),
            created_at: now,
            last_accessed: now,
        }
    }
}
