mod common;

use axum::http::StatusCode;
use chat_service::services::ChatModelError;
use common::{body_string, get, test_router, RecordingChatModel};

#[tokio::test]
async fn health_check_returns_ok() {
    let app = test_router(RecordingChatModel::replying("unused"));

    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "chat-service");
}

#[tokio::test]
async fn readiness_follows_backend_health() {
    let app = test_router(RecordingChatModel::replying("unused"));
    assert_eq!(get(app, "/ready").await.status(), StatusCode::OK);

    let app = test_router(RecordingChatModel::failing(|| {
        ChatModelError::Network("connection refused".to_string())
    }));
    assert_eq!(
        get(app, "/ready").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn api_responses_carry_security_headers() {
    let app = test_router(RecordingChatModel::replying("hi"));

    let response = get(app, "/chat?m=hello").await;

    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
