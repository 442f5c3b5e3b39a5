//! ChatRepository trait definition.
//!
//! Persistence operations for chat sessions and turns. The SQLite
//! implementation lives in studium-infra; core code (service, retention
//! policy) depends only on this trait. Uses native async fn in traits
//! (RPITIT, Rust 2024 edition).

use studium_types::chat::{ChatMessage, ChatSession};
use studium_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat session and turn persistence.
pub trait ChatRepository: Send + Sync {
    /// Create a new chat session.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a session by id, scoped to its owner.
    ///
    /// Returns `None` both when the session does not exist and when it
    /// belongs to a different owner.
    fn get_session_for_owner(
        &self,
        session_id: &Uuid,
        owner_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// List an owner's sessions, most recently updated first.
    fn list_sessions(
        &self,
        owner_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Update a session's title and bump `updated_at`.
    fn update_title(
        &self,
        session_id: &Uuid,
        title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Bump a session's `updated_at` to now.
    fn touch_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a session and cascade its turns.
    fn delete_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Clear the active flag on every session of an owner.
    fn deactivate_all(
        &self,
        owner_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Mark one session active. The caller clears the others first via
    /// [`ChatRepository::deactivate_all`].
    fn set_active(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append a turn. The turn carries a server-assigned timestamp.
    fn save_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Full ordered history of a session, ascending by creation order
    /// (timestamp, then insertion order).
    fn get_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Total number of turns in a session.
    fn count_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;

    /// Number of user turns in a session (drives first-turn auto-titling).
    fn count_user_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;

    /// The two oldest turns of a session by creation order. May return
    /// fewer than two for short sessions.
    fn oldest_pair(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Delete turns by id. Returns the number actually deleted.
    fn delete_messages(
        &self,
        ids: &[Uuid],
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
