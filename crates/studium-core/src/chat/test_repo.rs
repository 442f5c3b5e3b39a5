//! In-memory `ChatRepository` for core-level tests.
//!
//! Mirrors the semantics of the SQLite implementation closely enough for
//! service and retention tests: creation-order ties are broken by an
//! insertion sequence number, owner scoping hides foreign sessions, and
//! deleting a session cascades its turns.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use studium_types::chat::{ChatMessage, ChatSession, TurnRole, DEFAULT_SESSION_TITLE};
use studium_types::error::RepositoryError;

use super::repository::ChatRepository;

#[derive(Default)]
struct Inner {
    sessions: HashMap<Uuid, ChatSession>,
    /// (insertion sequence, turn) pairs, append order preserved.
    messages: Vec<(u64, ChatMessage)>,
    next_seq: u64,
}

#[derive(Default)]
pub struct MemoryChatRepository {
    inner: Mutex<Inner>,
}

impl MemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session directly, bypassing the active-flag bookkeeping.
    pub async fn seed_session(&self, owner_id: Uuid) -> Uuid {
        let session = ChatSession {
            id: Uuid::now_v7(),
            owner_id,
            title: DEFAULT_SESSION_TITLE.to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = session.id;
        self.inner
            .lock()
            .unwrap()
            .sessions
            .insert(id, session);
        id
    }

    /// Append a turn directly with the given role.
    pub async fn seed_message(&self, session_id: Uuid, role: TurnRole, content: &str) {
        let message = ChatMessage {
            id: Uuid::now_v7(),
            session_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.save_message(&message).await.unwrap();
    }
}

impl ChatRepository for MemoryChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn get_session_for_owner(
        &self,
        session_id: &Uuid,
        owner_id: &Uuid,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sessions
            .get(session_id)
            .filter(|s| s.owner_id == *owner_id)
            .cloned())
    }

    async fn list_sessions(&self, owner_id: &Uuid) -> Result<Vec<ChatSession>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        let mut sessions: Vec<ChatSession> = inner
            .sessions
            .values()
            .filter(|s| s.owner_id == *owner_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn update_title(&self, session_id: &Uuid, title: &str) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner
            .sessions
            .get_mut(session_id)
            .ok_or(RepositoryError::NotFound)?;
        session.title = title.to_string();
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn touch_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner
            .sessions
            .get_mut(session_id)
            .ok_or(RepositoryError::NotFound)?;
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .sessions
            .remove(session_id)
            .ok_or(RepositoryError::NotFound)?;
        inner.messages.retain(|(_, m)| m.session_id != *session_id);
        Ok(())
    }

    async fn deactivate_all(&self, owner_id: &Uuid) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        for session in inner.sessions.values_mut() {
            if session.owner_id == *owner_id {
                session.is_active = false;
            }
        }
        Ok(())
    }

    async fn set_active(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner
            .sessions
            .get_mut(session_id)
            .ok_or(RepositoryError::NotFound)?;
        session.is_active = true;
        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.messages.push((seq, message.clone()));
        Ok(())
    }

    async fn get_messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<(u64, ChatMessage)> = inner
            .messages
            .iter()
            .filter(|(_, m)| m.session_id == *session_id)
            .cloned()
            .collect();
        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            a.created_at.cmp(&b.created_at).then(seq_a.cmp(seq_b))
        });
        Ok(rows.into_iter().map(|(_, m)| m).collect())
    }

    async fn count_messages(&self, session_id: &Uuid) -> Result<u32, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .messages
            .iter()
            .filter(|(_, m)| m.session_id == *session_id)
            .count() as u32)
    }

    async fn count_user_messages(&self, session_id: &Uuid) -> Result<u32, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .messages
            .iter()
            .filter(|(_, m)| m.session_id == *session_id && m.role == TurnRole::User)
            .count() as u32)
    }

    async fn oldest_pair(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut messages = self.get_messages(session_id).await?;
        messages.truncate(2);
        Ok(messages)
    }

    async fn delete_messages(&self, ids: &[Uuid]) -> Result<u64, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.messages.len();
        inner.messages.retain(|(_, m)| !ids.contains(&m.id));
        Ok((before - inner.messages.len()) as u64)
    }
}
