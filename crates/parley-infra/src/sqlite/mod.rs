//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod message;
pub mod pool;
pub mod subscription;
pub mod usage;

use chrono::{NaiveDate, NaiveDateTime};
use parley_types::error::RepositoryError;

/// Storage format for timestamps (sortable as text).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(column: &str, value: &str) -> Result<NaiveDateTime, RepositoryError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        RepositoryError::MalformedTimestamp {
            column: column.to_string(),
            value: value.to_string(),
        }
    })
}

pub(crate) fn parse_date(column: &str, value: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| RepositoryError::MalformedTimestamp {
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Classify a sqlx error: connection-level failures and lock timeouts mean
/// the store is unavailable, everything else is a query error.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Unavailable(e.to_string())
        }
        sqlx::Error::Database(db) if matches!(db.code().as_deref(), Some("5" | "6")) => {
            RepositoryError::Unavailable(e.to_string())
        }
        _ => RepositoryError::Query(e.to_string()),
    }
}
