use thiserror::Error;

/// Errors from presence engine operations.
///
/// Presence errors are local to one connection and never fatal: a
/// malformed event for one connection must not affect other connections
/// or rooms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresenceError {
    #[error("connection not registered")]
    NotRegistered,
}

/// Errors from repository operations (used by trait definitions in studium-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from chat session operations.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The session does not exist or belongs to a different owner.
    /// The two cases are deliberately indistinguishable to the caller.
    #[error("session not found")]
    SessionNotFound,

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Errors from the completion capability.
///
/// These are never surfaced to the end user: the chat service recovers by
/// recording a fallback assistant turn and reporting `success = false`.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request timed out")]
    Timeout,

    #[error("completion service error: {0}")]
    Service(String),

    #[error("malformed completion response: {0}")]
    Malformed(String),
}
