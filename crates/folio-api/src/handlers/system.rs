use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ApiError;
use crate::AppState;

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/config/cesium-token
pub async fn cesium_token(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    match &state.config.cesium_token {
        Some(token) => Ok(Json(json!({ "token": token }))),
        None => {
            tracing::warn!("CESIUM_ION_TOKEN is not set");
            Err(ApiError::Internal("Server configuration error.".to_string()))
        }
    }
}
