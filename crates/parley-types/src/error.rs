use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store could not be reached or a transaction could not be opened.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),

    /// A persisted timestamp or date does not match the storage format.
    /// Indicates corrupted data; never coerced to a default.
    #[error("malformed timestamp in column '{column}': '{value}'")]
    MalformedTimestamp { column: String, value: String },

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from quota and subscription accounting.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("amount out of range: {0}")]
    InvalidAmount(i64),
}

/// Errors from handling an inbound chat message.
///
/// A denied quota check is not an error; see `ChatOutcome::LimitReached`.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error("model gateway failure: {0}")]
    Model(#[from] LlmError),
}
