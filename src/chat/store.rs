use super::session::{ChatMode, Session, SessionId};
use crate::llm::ChatMessage;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

struct Entry {
    session: Mutex<Session>,
    turn: Arc<Mutex<()>>,
}

/// In-memory conversation state, keyed by conversation id.
///
/// The map lock is only held to look up or insert an entry, and a session's
/// own lock only for a single mutation. Callers that need a read-modify-write
/// across an await point (a whole chat turn) take [`SessionStore::lock_turn`]
/// first, which serializes work on one id without blocking other ids.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Entry>>>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn entry(&self, id: SessionId) -> Arc<Entry> {
        if let Some(entry) = self.sessions.read().await.get(&id) {
            return entry.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id)
            .or_insert_with(|| {
                debug!("Creating session {}", id);
                Arc::new(Entry {
                    session: Mutex::new(Session::new(id)),
                    turn: Arc::new(Mutex::new(())),
                })
            })
            .clone()
    }

    pub async fn get_or_create(&self, id: SessionId) -> Session {
        self.entry(id).await.session.lock().await.clone()
    }

    pub async fn snapshot(&self, id: SessionId) -> Option<Session> {
        let entry = self.sessions.read().await.get(&id).cloned()?;
        let session = entry.session.lock().await.clone();
        Some(session)
    }

    pub async fn append_user(&self, id: SessionId, text: &str) {
        self.append(id, ChatMessage::user(text)).await;
    }

    pub async fn append_assistant(&self, id: SessionId, text: &str) {
        self.append(id, ChatMessage::assistant(text)).await;
    }

    async fn append(&self, id: SessionId, message: ChatMessage) {
        self.entry(id).await.session.lock().await.push(message);
    }

    pub async fn reset(&self, id: SessionId) {
        self.entry(id).await.session.lock().await.clear();
        debug!("Session {} reset", id);
    }

    pub async fn set_mode(&self, id: SessionId, mode: ChatMode) {
        self.entry(id).await.session.lock().await.mode = mode;
        debug!("Session {} switched to {} mode", id, mode);
    }

    pub async fn toggle_mode(&self, id: SessionId) -> ChatMode {
        let entry = self.entry(id).await;
        let mut session = entry.session.lock().await;
        session.mode = session.mode.toggled();
        session.mode
    }

    /// Held for the duration of one conversation turn on `id`.
    pub async fn lock_turn(&self, id: SessionId) -> OwnedMutexGuard<()> {
        let turn = self.entry(id).await.turn.clone();
        turn.lock_owned().await
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
