//! Conversation history types for Parley.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::llm::Message;
use crate::user::UserId;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// A persisted conversation turn.
///
/// Immutable once written. `id` is assigned by the store and increases with
/// insertion order, which is the ordering history retrieval relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub user_id: UserId,
    pub role: MessageRole,
    pub content: String,
    /// Store-local wall clock time of the write.
    pub created_at: NaiveDateTime,
}

impl StoredMessage {
    /// Strip the storage metadata, keeping what a model prompt needs.
    pub fn into_turn(self) -> Message {
        Message {
            role: self.role,
            content: self.content,
        }
    }
}

/// Result of handling one inbound user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChatOutcome {
    /// The model answered; both turns were saved to history.
    Reply { text: String },
    /// The user has no subscription and today's quota is used up.
    LimitReached,
}
