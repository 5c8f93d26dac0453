//! Health check handlers

use application::DataSource;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check - is the server running?
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub stops: StopIndexStatus,
}

/// State of the stop index
#[derive(Debug, Clone, Serialize)]
pub struct StopIndexStatus {
    pub loaded: bool,
    pub stop_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DataSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Readiness check - has a non-empty stop snapshot been published?
///
/// Never triggers a load.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let stops = match state.stop_index.current() {
        Some(snapshot) => StopIndexStatus {
            loaded: true,
            stop_count: snapshot.len(),
            source: Some(snapshot.source()),
            loaded_at: Some(snapshot.loaded_at()),
        },
        None => StopIndexStatus {
            loaded: false,
            stop_count: 0,
            source: None,
            loaded_at: None,
        },
    };

    let ready = stops.loaded && stops.stop_count > 0;
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(ReadinessResponse { ready, stops }))
}
