//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/users/{id}/messages", post(handlers::message::send_message))
        .route(
            "/users/{id}/history",
            get(handlers::message::get_history).delete(handlers::message::clear_history),
        )
        .route("/users/{id}/status", get(handlers::user::get_status))
        .route(
            "/users/{id}/subscription",
            post(handlers::user::activate_subscription),
        )
        .route("/users/{id}/credit", post(handlers::user::grant_credit))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use parley_types::config::ParleyConfig;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;

    async fn test_state(config: ParleyConfig) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        let mut config = config;
        // Nothing listens here; tests never reach the model.
        config.model.base_url = "http://127.0.0.1:9".to_string();
        AppState::build(data_dir, config, Some(SecretString::from("sk-test".to_string())))
            .await
            .unwrap()
    }

    async fn call(router: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let router = build_router(test_state(ParleyConfig::default()).await);
        let (status, json) = call(&router, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_status_for_new_user() {
        let router = build_router(test_state(ParleyConfig::default()).await);
        let (status, json) = call(&router, "GET", "/api/v1/users/42/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["user_id"], 42);
        assert!(json["data"]["days_left"].is_null());
        assert_eq!(json["data"]["messages_left"], 50);
    }

    #[tokio::test]
    async fn test_credit_then_status() {
        let router = build_router(test_state(ParleyConfig::default()).await);
        let (status, json) =
            call(&router, "POST", "/api/v1/users/42/credit", Some(r#"{"amount": 20}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["count"], -20);

        let (_, json) = call(&router, "GET", "/api/v1/users/42/status", None).await;
        assert_eq!(json["data"]["messages_left"], 70);
    }

    #[tokio::test]
    async fn test_subscription_makes_status_unlimited() {
        let router = build_router(test_state(ParleyConfig::default()).await);
        let (status, json) = call(
            &router,
            "POST",
            "/api/v1/users/7/subscription",
            Some(r#"{"days": 10}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["user_id"], 7);

        let (_, json) = call(&router, "GET", "/api/v1/users/7/status", None).await;
        assert_eq!(json["data"]["messages_left"], "unlimited");
        let days_left = json["data"]["days_left"].as_i64().unwrap();
        assert!((10..=11).contains(&days_left));
    }

    #[tokio::test]
    async fn test_subscription_rejects_zero_days() {
        let router = build_router(test_state(ParleyConfig::default()).await);
        let (status, json) = call(
            &router,
            "POST",
            "/api/v1/users/7/subscription",
            Some(r#"{"days": 0}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_subscription_rejects_out_of_range_days() {
        let router = build_router(test_state(ParleyConfig::default()).await);
        let (status, json) = call(
            &router,
            "POST",
            "/api/v1/users/7/subscription",
            Some(r#"{"days": 9223372036854775807}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");

        let (_, json) = call(&router, "GET", "/api/v1/users/7/status", None).await;
        assert!(json["data"]["days_left"].is_null());
    }

    #[tokio::test]
    async fn test_message_over_limit_reports_limit_reached() {
        let config = ParleyConfig {
            daily_limit: 0,
            ..ParleyConfig::default()
        };
        let router = build_router(test_state(config).await);
        let (status, json) = call(
            &router,
            "POST",
            "/api/v1/users/5/messages",
            Some(r#"{"name": "Anna", "text": "hello"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["outcome"], "limit_reached");
    }

    #[tokio::test]
    async fn test_history_empty_then_cleared() {
        let router = build_router(test_state(ParleyConfig::default()).await);
        let (status, json) = call(&router, "GET", "/api/v1/users/5/history?limit=3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], serde_json::json!([]));

        let (status, json) = call(&router, "DELETE", "/api/v1/users/5/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["deleted"], 0);
    }

    #[tokio::test]
    async fn test_invalid_user_id_is_rejected() {
        let router = build_router(test_state(ParleyConfig::default()).await);
        let (status, json) = call(&router, "GET", "/api/v1/users/alice/status", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");
    }
}
