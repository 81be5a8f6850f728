//! Chat message and history handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use parley_types::chat::{ChatOutcome, StoredMessage};
use parley_types::user::ChatUser;

use crate::http::error::AppError;
use crate::http::handlers::parse_user_id;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body of `POST /users/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Display name used in the system prompt.
    pub name: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// POST /api/v1/users/{id}/messages - Answer one message, or report the limit.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<ChatOutcome>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    if body.text.trim().is_empty() {
        return Err(AppError::Validation("message text must not be empty".into()));
    }

    let user = ChatUser::new(user_id, body.name);
    let outcome = state.chat_service.handle_message(&user, &body.text).await?;

    Ok(Json(ApiResponse::success(outcome, start)))
}

/// GET /api/v1/users/{id}/history - Recent messages, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<StoredMessage>>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;

    let messages = state.chat_service.history(user_id, query.limit).await?;

    Ok(Json(ApiResponse::success(messages, start)))
}

/// DELETE /api/v1/users/{id}/history - Forget the user's conversation.
pub async fn clear_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;

    let deleted = state.chat_service.clear_history(user_id).await?;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": deleted }),
        start,
    )))
}
