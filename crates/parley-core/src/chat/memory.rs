//! Per-user rolling conversation memory.

use parley_types::chat::{MessageRole, StoredMessage};
use parley_types::error::RepositoryError;
use parley_types::llm::Message;
use parley_types::user::UserId;
use tracing::info;

use crate::repository::message::MessageRepository;

/// Number of past turns recalled when the caller does not say otherwise.
pub const DEFAULT_HISTORY_LIMIT: u32 = 5;

/// Thin layer over a `MessageRepository` that speaks in prompt turns.
pub struct ConversationMemory<M: MessageRepository> {
    repo: M,
}

impl<M: MessageRepository> ConversationMemory<M> {
    pub fn new(repo: M) -> Self {
        Self { repo }
    }

    /// The last `limit` turns, oldest first, ready to feed to the model.
    pub async fn recent_history(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Message>, RepositoryError> {
        Ok(self
            .repo
            .fetch_recent_messages(user_id, limit)
            .await?
            .into_iter()
            .map(StoredMessage::into_turn)
            .collect())
    }

    /// The last `limit` stored messages with their IDs and timestamps.
    pub async fn recent_entries(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        self.repo.fetch_recent_messages(user_id, limit).await
    }

    pub async fn append(
        &self,
        user_id: UserId,
        role: MessageRole,
        content: &str,
    ) -> Result<i64, RepositoryError> {
        self.repo.append_message(user_id, role, content).await
    }

    /// Forget everything the user has said. Returns the number of messages removed.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let deleted = self.repo.delete_all_messages(user_id).await?;
        info!(user_id = %user_id, deleted, "Conversation history cleared");
        Ok(deleted)
    }

    pub async fn message_count(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        self.repo.count_messages(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    #[tokio::test]
    async fn test_recent_history_keeps_last_turns_in_order() {
        let memory = ConversationMemory::new(InMemoryStore::new());
        for i in 1..=7 {
            memory
                .append(UserId(1), MessageRole::User, &format!("m{i}"))
                .await
                .unwrap();
        }

        let history = memory.recent_history(UserId(1), DEFAULT_HISTORY_LIMIT).await.unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m3", "m4", "m5", "m6", "m7"]);
    }

    #[tokio::test]
    async fn test_history_is_per_user() {
        let memory = ConversationMemory::new(InMemoryStore::new());
        memory.append(UserId(1), MessageRole::User, "hello").await.unwrap();
        memory.append(UserId(2), MessageRole::User, "other").await.unwrap();
        memory.append(UserId(1), MessageRole::Assistant, "hi there").await.unwrap();

        let history = memory.recent_history(UserId(1), 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Message::new(MessageRole::User, "hello"));
        assert_eq!(history[1], Message::new(MessageRole::Assistant, "hi there"));
    }

    #[tokio::test]
    async fn test_clear_empties_history() {
        let memory = ConversationMemory::new(InMemoryStore::new());
        memory.append(UserId(1), MessageRole::User, "a").await.unwrap();
        memory.append(UserId(1), MessageRole::Assistant, "b").await.unwrap();
        memory.append(UserId(2), MessageRole::User, "c").await.unwrap();

        assert_eq!(memory.clear(UserId(1)).await.unwrap(), 2);
        assert!(memory.recent_history(UserId(1), 5).await.unwrap().is_empty());
        assert_eq!(memory.message_count(UserId(2)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_without_history_is_zero() {
        let memory = ConversationMemory::new(InMemoryStore::new());
        assert_eq!(memory.clear(UserId(9)).await.unwrap(), 0);
    }
}
