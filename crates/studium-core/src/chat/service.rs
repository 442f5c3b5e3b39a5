//! Conversation orchestration.
//!
//! `ChatService` owns the full lifecycle of a study conversation: session
//! CRUD, the send-message flow (persist user turn, derive a title on the
//! first turn, call the completion provider under a deadline, persist the
//! reply), and bounded-history eviction after every assistant turn.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use studium_types::chat::{ChatMessage, ChatSession, TurnRole, DEFAULT_SESSION_TITLE};
use studium_types::error::ChatError;
use studium_types::llm::{CompletionRequest, Message};

use crate::llm::CompletionProvider;

use super::formatting::normalize_reply;
use super::repository::ChatRepository;
use super::retention::RetentionPolicy;
use super::title::derive_title;

/// Hard deadline for one completion round-trip.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(20);

const SYSTEM_PROMPT: &str = "You are a friendly study assistant. Answer clearly and \
concisely, and put code examples in fenced code blocks.";

const FALLBACK_UNCONFIGURED: &str = "The AI assistant is not configured.";
const FALLBACK_TIMEOUT: &str = "The request timed out. Please try again later.";
const FALLBACK_UNAVAILABLE: &str =
    "The AI assistant is temporarily unavailable. Please try again later.";

/// What the caller gets back from [`ChatService::send_message`].
///
/// A failed completion still produces a reply (the fallback turn); it is
/// flagged with `success = false` rather than surfaced as an error.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub success: bool,
    pub reply: String,
    pub model: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub struct ChatService<R, P> {
    repo: R,
    provider: Option<P>,
    retention: RetentionPolicy,
}

impl<R, P> ChatService<R, P>
where
    R: ChatRepository,
    P: CompletionProvider,
{
    pub fn new(repo: R, provider: Option<P>) -> Self {
        Self {
            repo,
            provider,
            retention: RetentionPolicy::default(),
        }
    }

    #[cfg(test)]
    fn with_retention(repo: R, provider: Option<P>, retention: RetentionPolicy) -> Self {
        Self {
            repo,
            provider,
            retention,
        }
    }

    /// Create a fresh session for `owner_id` and make it the active one.
    pub async fn create_session(&self, owner_id: Uuid) -> Result<ChatSession, ChatError> {
        self.repo.deactivate_all(&owner_id).await?;
        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::now_v7(),
            owner_id,
            title: DEFAULT_SESSION_TITLE.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        Ok(self.repo.create_session(&session).await?)
    }

    /// All of the owner's sessions, most recently updated first.
    pub async fn list_sessions(&self, owner_id: Uuid) -> Result<Vec<ChatSession>, ChatError> {
        Ok(self.repo.list_sessions(&owner_id).await?)
    }

    pub async fn rename_session(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
        title: &str,
    ) -> Result<(), ChatError> {
        self.require_session(&owner_id, &session_id).await?;
        self.repo.update_title(&session_id, title).await?;
        Ok(())
    }

    pub async fn delete_session(&self, owner_id: Uuid, session_id: Uuid) -> Result<(), ChatError> {
        self.require_session(&owner_id, &session_id).await?;
        self.repo.delete_session(&session_id).await?;
        Ok(())
    }

    /// Mark one session active, deactivating the owner's others.
    pub async fn activate_session(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
    ) -> Result<(), ChatError> {
        self.require_session(&owner_id, &session_id).await?;
        self.repo.deactivate_all(&owner_id).await?;
        self.repo.set_active(&session_id).await?;
        Ok(())
    }

    pub async fn get_messages(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.require_session(&owner_id, &session_id).await?;
        Ok(self.repo.get_messages(&session_id).await?)
    }

    /// The send-message flow.
    ///
    /// Persists the user turn, then obtains an assistant turn one way or
    /// another: from the provider within [`COMPLETION_TIMEOUT`], or as a
    /// fallback message when the provider is missing, slow, or broken. The
    /// assistant turn is always appended, so the stored history stays an
    /// alternating user/assistant sequence.
    pub async fn send_message(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
        text: &str,
    ) -> Result<ChatReply, ChatError> {
        let session = self.require_session(&owner_id, &session_id).await?;

        self.append_turn(session_id, TurnRole::User, text).await?;
        self.maybe_title(&session, text).await?;

        let (success, reply, model) = self.obtain_reply(&session_id).await?;

        self.append_turn(session_id, TurnRole::Assistant, &reply)
            .await?;
        self.repo.touch_session(&session_id).await?;

        // Both turns are already stored, so an eviction failure must not
        // cost the caller its reply. Log it and move on.
        if let Err(err) = self.retention.maybe_evict(&self.repo, &session_id).await {
            warn!(session = %session_id, error = %err, "history eviction failed");
        }

        Ok(ChatReply {
            success,
            reply,
            model,
            timestamp: Utc::now(),
        })
    }

    async fn require_session(
        &self,
        owner_id: &Uuid,
        session_id: &Uuid,
    ) -> Result<ChatSession, ChatError> {
        self.repo
            .get_session_for_owner(session_id, owner_id)
            .await?
            .ok_or(ChatError::SessionNotFound)
    }

    async fn append_turn(
        &self,
        session_id: Uuid,
        role: TurnRole,
        content: &str,
    ) -> Result<(), ChatError> {
        let message = ChatMessage {
            id: Uuid::now_v7(),
            session_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.repo.save_message(&message).await?;
        Ok(())
    }

    /// Derive a title from the first user turn, but only while the session
    /// still carries the default one.
    async fn maybe_title(&self, session: &ChatSession, text: &str) -> Result<(), ChatError> {
        if session.title != DEFAULT_SESSION_TITLE {
            return Ok(());
        }
        if self.repo.count_user_messages(&session.id).await? != 1 {
            return Ok(());
        }
        self.repo
            .update_title(&session.id, &derive_title(text))
            .await?;
        Ok(())
    }

    async fn obtain_reply(
        &self,
        session_id: &Uuid,
    ) -> Result<(bool, String, Option<String>), ChatError> {
        let Some(provider) = &self.provider else {
            return Ok((false, FALLBACK_UNCONFIGURED.to_string(), None));
        };

        let history = self.repo.get_messages(session_id).await?;
        let request = CompletionRequest {
            model: String::new(),
            messages: history
                .iter()
                .map(|m| Message {
                    role: m.role.into(),
                    content: m.content.clone(),
                })
                .collect(),
            system: Some(SYSTEM_PROMPT.to_string()),
            max_tokens: 1500,
            temperature: Some(0.7),
        };

        match tokio::time::timeout(COMPLETION_TIMEOUT, provider.complete(&request)).await {
            Ok(Ok(response)) => Ok((
                true,
                normalize_reply(&response.content),
                Some(response.model),
            )),
            Ok(Err(err)) => {
                warn!(provider = provider.name(), error = %err, "completion failed");
                Ok((false, FALLBACK_UNAVAILABLE.to_string(), None))
            }
            Err(_) => {
                debug!(provider = provider.name(), "completion deadline elapsed");
                Ok((false, FALLBACK_TIMEOUT.to_string(), None))
            }
        }
    }
}
