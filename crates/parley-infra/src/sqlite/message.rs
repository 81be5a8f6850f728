//! SQLite message repository implementation.
//!
//! Implements `MessageRepository` from `parley-core` over the `messages`
//! table. The store stamps each row with its local write time.

use parley_core::repository::message::MessageRepository;
use parley_types::chat::{MessageRole, StoredMessage};
use parley_types::error::RepositoryError;
use parley_types::user::UserId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{map_sqlx_error, parse_timestamp};

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

struct MessageRow {
    id: i64,
    user_id: i64,
    role: String,
    content: String,
    timestamp: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_message(self) -> Result<StoredMessage, RepositoryError> {
        let role = self
            .role
            .parse::<MessageRole>()
            .map_err(RepositoryError::Query)?;

        Ok(StoredMessage {
            id: self.id,
            user_id: UserId(self.user_id),
            role,
            content: self.content,
            created_at: parse_timestamp("timestamp", &self.timestamp)?,
        })
    }
}

// ---------------------------------------------------------------------------
// MessageRepository impl
// ---------------------------------------------------------------------------

impl MessageRepository for SqliteMessageRepository {
    async fn append_message(
        &self,
        user_id: UserId,
        role: MessageRole,
        content: &str,
    ) -> Result<i64, RepositoryError> {
        let result = sqlx::query("INSERT INTO messages (user_id, role, content) VALUES (?, ?, ?)")
            .bind(user_id.as_i64())
            .bind(role.to_string())
            .bind(content)
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn fetch_recent_messages(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, role, content, timestamp FROM messages
               WHERE user_id = ?
               ORDER BY id DESC
               LIMIT ?"#,
        )
        .bind(user_id.as_i64())
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in rows.iter().rev() {
            let r = MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(r.into_message()?);
        }
        Ok(messages)
    }

    async fn delete_all_messages(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE user_id = ?")
            .bind(user_id.as_i64())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn count_messages(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE user_id = ?")
            .bind(user_id.as_i64())
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count as u64)
    }
}
