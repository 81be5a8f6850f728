//! Message history repository trait definition.

use parley_types::chat::{MessageRole, StoredMessage};
use parley_types::error::RepositoryError;
use parley_types::user::UserId;

/// Repository trait for per-user conversation history.
///
/// Messages are append-only; the only mutation besides insert is deleting a
/// user's entire history. Uses native async fn in traits (Rust 2024 edition).
pub trait MessageRepository: Send + Sync {
    /// Append one turn. The store assigns the ID and the write timestamp.
    /// Returns the new message ID.
    fn append_message(
        &self,
        user_id: UserId,
        role: MessageRole,
        content: &str,
    ) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;

    /// The `limit` most recent messages for a user, oldest first.
    fn fetch_recent_messages(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<StoredMessage>, RepositoryError>> + Send;

    /// Delete every message of a user. Returns the number of rows removed.
    fn delete_all_messages(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Number of stored messages for a user.
    fn count_messages(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
