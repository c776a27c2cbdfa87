use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running")
    ),
    tag = "Observability"
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "chat-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check: the chat-model backend must be reachable.
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Chat-model backend reachable"),
        (status = 503, description = "Chat-model backend unreachable")
    ),
    tag = "Observability"
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.chat_model.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(
                model = %state.chat_model.model_name(),
                error = %e,
                "Chat-model backend not ready"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
