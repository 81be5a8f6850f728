//! SQLite subscription repository implementation.

use parley_core::repository::subscription::SubscriptionRepository;
use parley_types::error::RepositoryError;
use parley_types::quota::SubscriptionWindow;
use parley_types::user::UserId;
use sqlx::Row;
use tracing::debug;

use super::pool::DatabasePool;
use super::{format_timestamp, map_sqlx_error, parse_timestamp};

/// SQLite-backed implementation of `SubscriptionRepository`.
#[derive(Clone)]
pub struct SqliteSubscriptionRepository {
    pool: DatabasePool,
}

impl SqliteSubscriptionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

struct SubscriptionRow {
    user_id: i64,
    start_date: String,
    end_date: String,
}

impl SubscriptionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
        })
    }

    fn into_window(self) -> Result<SubscriptionWindow, RepositoryError> {
        Ok(SubscriptionWindow {
            user_id: UserId(self.user_id),
            start: parse_timestamp("start_date", &self.start_date)?,
            end: parse_timestamp("end_date", &self.end_date)?,
        })
    }
}

// ---------------------------------------------------------------------------
// SubscriptionRepository impl
// ---------------------------------------------------------------------------

impl SubscriptionRepository for SqliteSubscriptionRepository {
    async fn fetch_subscription(
        &self,
        user_id: UserId,
    ) -> Result<Option<SubscriptionWindow>, RepositoryError> {
        let row = sqlx::query(
            "SELECT user_id, start_date, end_date FROM subscriptions WHERE user_id = ?",
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => {
                let r = SubscriptionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(r.into_window()?))
            }
            None => Ok(None),
        }
    }

    async fn upsert_subscription(&self, window: &SubscriptionWindow) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO subscriptions (user_id, start_date, end_date) VALUES (?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET
                   start_date = excluded.start_date,
                   end_date = excluded.end_date"#,
        )
        .bind(window.user_id.as_i64())
        .bind(format_timestamp(&window.start))
        .bind(format_timestamp(&window.end))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn compare_and_set_subscription(
        &self,
        expected: Option<&SubscriptionWindow>,
        new: &SubscriptionWindow,
    ) -> Result<bool, RepositoryError> {
        let result = match expected {
            None => sqlx::query(
                r#"INSERT INTO subscriptions (user_id, start_date, end_date) VALUES (?, ?, ?)
                   ON CONFLICT(user_id) DO NOTHING"#,
            )
            .bind(new.user_id.as_i64())
            .bind(format_timestamp(&new.start))
            .bind(format_timestamp(&new.end))
            .execute(&self.pool.writer)
            .await,
            Some(old) => sqlx::query(
                r#"UPDATE subscriptions SET start_date = ?, end_date = ?
                   WHERE user_id = ? AND start_date = ? AND end_date = ?"#,
            )
            .bind(format_timestamp(&new.start))
            .bind(format_timestamp(&new.end))
            .bind(new.user_id.as_i64())
            .bind(format_timestamp(&old.start))
            .bind(format_timestamp(&old.end))
            .execute(&self.pool.writer)
            .await,
        }
        .map_err(map_sqlx_error)?;

        let written = result.rows_affected() == 1;
        if !written {
            debug!(user_id = %new.user_id, "Subscription compare-and-set lost");
        }
        Ok(written)
    }
}
