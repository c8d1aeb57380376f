//! Health check handler.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub services: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/health
///
/// 200 iff both the database and the probe tool answer; 503 otherwise.
pub async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let mut services = HashMap::new();
    let mut messages = Vec::new();

    match clipvote_db::ping(&state.pool).await {
        Ok(()) => {
            services.insert("database".to_string(), "healthy".to_string());
        }
        Err(_) => {
            services.insert("database".to_string(), "unhealthy".to_string());
            messages.push("Database connection failed".to_string());
        }
    }

    if state.services.videos.check_probe_tool().await {
        services.insert("ffprobe".to_string(), "healthy".to_string());
    } else {
        services.insert("ffprobe".to_string(), "unhealthy".to_string());
        messages.push("FFprobe not available for video validation".to_string());
    }

    let healthy = messages.is_empty();
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        services,
        message: messages.into_iter().next(),
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
