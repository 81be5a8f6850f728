//! HTTP request handlers for the REST API.

pub mod message;
pub mod user;

use parley_types::user::UserId;

use crate::http::error::AppError;

/// Parse the `{id}` path segment into a [`UserId`].
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    raw.parse::<UserId>().map_err(AppError::Validation)
}
