use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Liveness probe and friendly root route.
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "GameGems backend is running".to_string(),
    })
}
