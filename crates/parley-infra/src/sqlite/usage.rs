//! SQLite usage counter repository implementation.
//!
//! One row per user in `limits`. The compare-and-set write matches the full
//! expected row (date and count), so a concurrent change by another request
//! makes it a no-op that the caller detects.

use parley_core::repository::usage::UsageRepository;
use parley_types::error::RepositoryError;
use parley_types::quota::UsageCounter;
use parley_types::user::UserId;
use sqlx::Row;
use tracing::debug;

use super::pool::DatabasePool;
use super::{format_date, map_sqlx_error, parse_date};

/// SQLite-backed implementation of `UsageRepository`.
#[derive(Clone)]
pub struct SqliteUsageRepository {
    pool: DatabasePool,
}

impl SqliteUsageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

struct CounterRow {
    user_id: i64,
    date: String,
    count: i64,
}

impl CounterRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            date: row.try_get("date")?,
            count: row.try_get("count")?,
        })
    }

    fn into_counter(self) -> Result<UsageCounter, RepositoryError> {
        Ok(UsageCounter {
            user_id: UserId(self.user_id),
            date: parse_date("date", &self.date)?,
            count: self.count,
        })
    }
}

// ---------------------------------------------------------------------------
// UsageRepository impl
// ---------------------------------------------------------------------------

impl UsageRepository for SqliteUsageRepository {
    async fn fetch_counter(&self, user_id: UserId) -> Result<Option<UsageCounter>, RepositoryError> {
        let row = sqlx::query("SELECT user_id, date, count FROM limits WHERE user_id = ?")
            .bind(user_id.as_i64())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => {
                let r = CounterRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(r.into_counter()?))
            }
            None => Ok(None),
        }
    }

    async fn upsert_counter(&self, counter: &UsageCounter) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO limits (user_id, date, count) VALUES (?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET date = excluded.date, count = excluded.count"#,
        )
        .bind(counter.user_id.as_i64())
        .bind(format_date(&counter.date))
        .bind(counter.count)
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn compare_and_set_counter(
        &self,
        expected: Option<&UsageCounter>,
        new: &UsageCounter,
    ) -> Result<bool, RepositoryError> {
        let result = match expected {
            None => sqlx::query(
                r#"INSERT INTO limits (user_id, date, count) VALUES (?, ?, ?)
                   ON CONFLICT(user_id) DO NOTHING"#,
            )
            .bind(new.user_id.as_i64())
            .bind(format_date(&new.date))
            .bind(new.count)
            .execute(&self.pool.writer)
            .await,
            Some(old) => sqlx::query(
                r#"UPDATE limits SET date = ?, count = ?
                   WHERE user_id = ? AND date = ? AND count = ?"#,
            )
            .bind(format_date(&new.date))
            .bind(new.count)
            .bind(new.user_id.as_i64())
            .bind(format_date(&old.date))
            .bind(old.count)
            .execute(&self.pool.writer)
            .await,
        }
        .map_err(map_sqlx_error)?;

        let written = result.rows_affected() == 1;
        if !written {
            debug!(user_id = %new.user_id, "Usage counter compare-and-set lost");
        }
        Ok(written)
    }
}
