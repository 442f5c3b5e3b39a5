//! Bounded-history retention: FIFO pruning of matched turn pairs.
//!
//! A session's stored history is capped so the context sent to the
//! completion provider cannot grow without bound, while conversational
//! coherence is preserved by only ever removing a whole user/assistant
//! exchange.
//!
//! Known limitation, kept deliberately: when the two oldest turns are not
//! a (user, assistant) pair -- e.g. consecutive assistant turns left by an
//! error-recovery path -- no deletion happens on that invocation, and
//! since the policy only ever looks at the oldest pair, such a session
//! stops shrinking until the malformed pair is corrected manually. The
//! policy is re-evaluated on every append.

use studium_types::chat::TurnRole;
use studium_types::error::RepositoryError;
use uuid::Uuid;

use super::repository::ChatRepository;

/// Default retention bound: evict once a session holds more turns than this.
pub const MAX_SESSION_TURNS: u32 = 20;

/// Evicts the oldest complete user/assistant pair once a session exceeds
/// its retention bound.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    max_turns: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_turns: MAX_SESSION_TURNS,
        }
    }
}

impl RetentionPolicy {
    pub fn new(max_turns: u32) -> Self {
        Self { max_turns }
    }

    /// Apply the policy to a session. Returns whether a pair was deleted.
    ///
    /// - `count <= max_turns`: no-op.
    /// - Oldest two turns are exactly (user, assistant): delete both.
    /// - Anything else (including fewer than two turns): no deletion.
    pub async fn maybe_evict<R: ChatRepository>(
        &self,
        repo: &R,
        session_id: &Uuid,
    ) -> Result<bool, RepositoryError> {
        let count = repo.count_messages(session_id).await?;
        if count <= self.max_turns {
            return Ok(false);
        }

        let oldest = repo.oldest_pair(session_id).await?;
        let [first, second] = oldest.as_slice() else {
            return Ok(false);
        };

        if first.role != TurnRole::User || second.role != TurnRole::Assistant {
            tracing::debug!(
                session = %session_id,
                first = %first.role,
                second = %second.role,
                "oldest pair is not user/assistant, skipping eviction"
            );
            return Ok(false);
        }

        let deleted = repo.delete_messages(&[first.id, second.id]).await?;
        tracing::debug!(session = %session_id, deleted, "evicted oldest turn pair");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::test_repo::MemoryChatRepository;

    async fn seeded_session(repo: &MemoryChatRepository, turns: &[TurnRole]) -> Uuid {
        let session_id = repo.seed_session(Uuid::now_v7()).await;
        for role in turns {
            repo.seed_message(session_id, *role, "x").await;
        }
        session_id
    }

    /// Alternating user/assistant turns, user first.
    fn alternating(count: usize) -> Vec<TurnRole> {
        (0..count)
            .map(|i| {
                if i % 2 == 0 {
                    TurnRole::User
                } else {
                    TurnRole::Assistant
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn test_at_bound_is_noop() {
        let repo = MemoryChatRepository::new();
        let session_id = seeded_session(&repo, &alternating(20)).await;

        let evicted = RetentionPolicy::default()
            .maybe_evict(&repo, &session_id)
            .await
            .unwrap();

        assert!(!evicted);
        assert_eq!(repo.count_messages(&session_id).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_over_bound_deletes_exactly_oldest_pair() {
        let repo = MemoryChatRepository::new();
        let session_id = seeded_session(&repo, &alternating(21)).await;
        let before = repo.get_messages(&session_id).await.unwrap();

        let evicted = RetentionPolicy::default()
            .maybe_evict(&repo, &session_id)
            .await
            .unwrap();

        assert!(evicted);
        let after = repo.get_messages(&session_id).await.unwrap();
        assert_eq!(after.len(), 19);
        // Exactly the two oldest turns are gone; order is preserved.
        assert_eq!(after[0].id, before[2].id);
        assert_eq!(after.last().unwrap().id, before.last().unwrap().id);
    }

    #[tokio::test]
    async fn test_malformed_oldest_pair_blocks_eviction() {
        let repo = MemoryChatRepository::new();
        let mut turns = vec![TurnRole::Assistant, TurnRole::Assistant];
        turns.extend(alternating(19));
        let session_id = seeded_session(&repo, &turns).await;

        let evicted = RetentionPolicy::default()
            .maybe_evict(&repo, &session_id)
            .await
            .unwrap();

        // No deletion regardless of total count.
        assert!(!evicted);
        assert_eq!(repo.count_messages(&session_id).await.unwrap(), 21);
    }

    #[tokio::test]
    async fn test_reversed_pair_blocks_eviction() {
        let repo = MemoryChatRepository::new();
        let mut turns = vec![TurnRole::Assistant, TurnRole::User];
        turns.extend(alternating(19));
        let session_id = seeded_session(&repo, &turns).await;

        let evicted = RetentionPolicy::default()
            .maybe_evict(&repo, &session_id)
            .await
            .unwrap();

        assert!(!evicted);
    }

    #[tokio::test]
    async fn test_custom_bound() {
        let repo = MemoryChatRepository::new();
        let session_id = seeded_session(&repo, &alternating(5)).await;

        let evicted = RetentionPolicy::new(4)
            .maybe_evict(&repo, &session_id)
            .await
            .unwrap();

        assert!(evicted);
        assert_eq!(repo.count_messages(&session_id).await.unwrap(), 3);
    }
}
