//! Health check handlers.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub engine: CheckStatus,
    pub checkpoints: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms: Some(latency_ms),
        }
    }

    fn state(state: &str) -> Self {
        Self {
            status: state.to_string(),
            error: None,
            latency_ms: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }
}

/// Readiness probe.
///
/// Fails only when the engine is unreachable. The checkpoint gate state is
/// reported as-is; weights are verified on the first generation.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let engine_check = {
        let start = Instant::now();
        match state.service.pipeline().health_check().await {
            Ok(true) => CheckStatus::ok(start.elapsed().as_millis() as u64),
            Ok(false) => CheckStatus::error("inference service reported unhealthy"),
            Err(e) => CheckStatus::error(e.to_string()),
        }
    };

    let checkpoint_state = state.service.checkpoints().state().await;
    let checkpoints_check = CheckStatus::state(checkpoint_state.as_str());

    let engine_ok = engine_check.status == "ok";
    let response = ReadinessResponse {
        status: if engine_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            engine: engine_check,
            checkpoints: checkpoints_check,
        },
    };

    if engine_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
