//! Quota and subscription handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use parley_types::quota::{SubscriptionWindow, UserStatus};

use crate::http::error::AppError;
use crate::http::handlers::parse_user_id;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body of `POST /users/{id}/subscription`.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeRequest {
    /// Length in days; the configured default when absent.
    pub days: Option<i64>,
}

/// Body of `POST /users/{id}/credit`.
#[derive(Debug, Deserialize)]
pub struct CreditRequest {
    pub amount: i64,
}

/// GET /api/v1/users/{id}/status - Subscription days and messages left.
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserStatus>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;

    let status = state.chat_service.status(user_id).await?;

    Ok(Json(ApiResponse::success(status, start)))
}

/// POST /api/v1/users/{id}/subscription - Activate or extend a subscription.
pub async fn activate_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<SubscribeRequest>>,
) -> Result<Json<ApiResponse<SubscriptionWindow>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let days = body.and_then(|Json(b)| b.days);

    let window = state
        .chat_service
        .activate_subscription(user_id, days)
        .await?;

    Ok(Json(ApiResponse::success(window, start)))
}

/// POST /api/v1/users/{id}/credit - Grant extra messages for today.
pub async fn grant_credit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CreditRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;

    let count = state.chat_service.grant_credit(user_id, body.amount).await?;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "user_id": user_id, "count": count }),
        start,
    )))
}
