//! Application error type mapping to HTTP status codes and envelope format.

use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use parley_types::error::{ChatError, QuotaError, RepositoryError};
use parley_types::llm::LlmError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Chat(ChatError),
    Quota(QuotaError),
    Repository(RepositoryError),
    /// Malformed path or body values.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<QuotaError> for AppError {
    fn from(e: QuotaError) -> Self {
        AppError::Quota(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

fn repository_status(e: &RepositoryError) -> (StatusCode, &'static str) {
    match e {
        RepositoryError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        RepositoryError::MalformedTimestamp { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "CORRUPTED_DATA")
        }
        RepositoryError::Query(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
    }
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Repository(e)
            | AppError::Quota(QuotaError::Repository(e))
            | AppError::Chat(ChatError::Repository(e))
            | AppError::Chat(ChatError::Quota(QuotaError::Repository(e))) => repository_status(e),
            AppError::Quota(QuotaError::InvalidAmount(_))
            | AppError::Chat(ChatError::Quota(QuotaError::InvalidAmount(_))) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Chat(ChatError::Model(LlmError::Timeout { .. })) => {
                (StatusCode::GATEWAY_TIMEOUT, "MODEL_TIMEOUT")
            }
            AppError::Chat(ChatError::Model(LlmError::RateLimited { .. })) => {
                (StatusCode::TOO_MANY_REQUESTS, "MODEL_RATE_LIMITED")
            }
            AppError::Chat(ChatError::Model(_)) => (StatusCode::BAD_GATEWAY, "MODEL_ERROR"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Chat(e) => e.to_string(),
            AppError::Quota(e) => e.to_string(),
            AppError::Repository(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, error = %self.message(), "Request failed");
        }

        let body = ApiResponse::error(code, &self.message(), Instant::now());
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_unavailable_is_503() {
        let err = AppError::from(ChatError::Repository(RepositoryError::Unavailable(
            "database is locked".into(),
        )));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE")
        );
    }

    #[test]
    fn test_model_failures_map_to_gateway_errors() {
        let timeout = AppError::from(ChatError::Model(LlmError::Timeout { after_ms: 60_000 }));
        assert_eq!(timeout.status_and_code().0, StatusCode::GATEWAY_TIMEOUT);

        let auth = AppError::from(ChatError::Model(LlmError::AuthenticationFailed));
        assert_eq!(auth.status_and_code(), (StatusCode::BAD_GATEWAY, "MODEL_ERROR"));
    }

    #[test]
    fn test_invalid_amount_is_validation_error() {
        let err = AppError::from(QuotaError::InvalidAmount(0));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        );
    }

    #[test]
    fn test_corruption_is_internal() {
        let err = AppError::from(RepositoryError::MalformedTimestamp {
            column: "date".into(),
            value: "x".into(),
        });
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
