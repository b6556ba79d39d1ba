//! In-memory session and conversation management
//!
//! Each session owns its data permissions and a bounded conversation history.
//! Sessions live for the process lifetime; there is no persistence and no
//! cross-session sharing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::models::{ConversationEntry, Permissions};

/// Conversation entries kept per session; the oldest are dropped first.
pub const MAX_CONVERSATION_ENTRIES: usize = 10;

/// Conversation turns replayed into the advisor prompt.
pub const PROMPT_HISTORY_TURNS: usize = 3;

/// A single user session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub permissions: Permissions,
    pub conversation: Vec<ConversationEntry>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Process-wide session registry.
///
/// Server handlers resolve the caller's session id to a [`Session`] here.
/// Unknown ids are materialized on first touch with default permissions, so
/// a client that skipped `/session/init` still works.
pub struct SessionManager {
    sessions: Mutex<HashMap<String, Session>>,
    counter: AtomicU64,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Create a fresh session with default permissions.
    pub fn init(&self) -> Session {
        let id = self.generate_id();
        let session = Session {
            id: id.clone(),
            permissions: Permissions::default(),
            conversation: Vec::new(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(id.clone(), session.clone());
        info!(session_id = %id, "New session initialized");
        session
    }

    /// Snapshot of an existing session, if any.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .get(id)
            .cloned()
    }

    /// Remove a session. Returns whether it existed.
    pub fn clear(&self, id: &str) -> bool {
        let removed = self
            .sessions
            .lock()
            .expect("session mutex poisoned")
            .remove(id)
            .is_some();
        if removed {
            info!(session_id = %id, "Session cleared");
        }
        removed
    }

    /// Current permissions for a session (defaults when unknown).
    pub fn permissions(&self, id: &str) -> Permissions {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        sessions
            .entry(id.to_string())
            .or_insert_with(|| new_session(id))
            .permissions
            .clone()
    }

    /// Apply a permission update and return the resulting set.
    pub fn update_permissions<F>(&self, id: &str, update: F) -> Permissions
    where
        F: FnOnce(&mut Permissions),
    {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| new_session(id));
        update(&mut session.permissions);
        session.permissions.clone()
    }

    /// Full conversation history, oldest first.
    pub fn conversation(&self, id: &str) -> Vec<ConversationEntry> {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .get(id)
            .map(|s| s.conversation.clone())
            .unwrap_or_default()
    }

    /// The most recent turns for prompt context.
    pub fn recent_turns(&self, id: &str) -> Vec<ConversationEntry> {
        let conversation = self.conversation(id);
        let skip = conversation.len().saturating_sub(PROMPT_HISTORY_TURNS);
        conversation.into_iter().skip(skip).collect()
    }

    /// Append a completed turn, truncating to the most recent
    /// [`MAX_CONVERSATION_ENTRIES`].
    pub fn append_turn(&self, id: &str, user_query: &str, ai_response: &str) {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| new_session(id));
        session.conversation.push(ConversationEntry {
            timestamp: Utc::now().to_rfc3339(),
            user_query: user_query.to_string(),
            ai_response: ai_response.to_string(),
        });
        if session.conversation.len() > MAX_CONVERSATION_ENTRIES {
            let excess = session.conversation.len() - MAX_CONVERSATION_ENTRIES;
            session.conversation.drain(..excess);
        }
    }

    /// Empty a session's conversation without touching its permissions.
    pub fn clear_conversation(&self, id: &str) {
        if let Some(session) = self
            .sessions
            .lock()
            .expect("session mutex poisoned")
            .get_mut(id)
        {
            session.conversation.clear();
        }
    }

    fn generate_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(now.to_le_bytes());
        hasher.update(n.to_le_bytes());
        hex::encode(&hasher.finalize()[..16])
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

fn new_session(id: &str) -> Session {
    Session {
        id: id.to_string(),
        permissions: Permissions::default(),
        conversation: Vec::new(),
        created_at: Utc::now().to_rfc3339(),
    }
}
