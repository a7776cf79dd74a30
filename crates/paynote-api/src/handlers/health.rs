use crate::constants::HEALTH_MESSAGE;
use axum::{http::StatusCode, response::IntoResponse, Json};

/// Liveness check. Remote backends are not contacted.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "message": HEALTH_MESSAGE })),
    )
}
