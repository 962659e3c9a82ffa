//! Video generation handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use holo_models::GenerateRequest;
use holo_worker::{prepare, WorkerError};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::middleware::RequestId;
use crate::state::AppState;

/// Response body of `POST /generate-video`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    pub video_url: String,
}

/// Generate one multi-shot video and return where to fetch it.
///
/// The request is fully validated before the checkpoint gate or the engine
/// is touched; invalid input is a 400 with no side effects.
pub async fn generate_video(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateVideoResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let prepared = prepare(request).map_err(|e| {
        warn!(request_id = %request_id, "Rejected generation request: {}", e);
        metrics::record_generation_failed("unknown", "client");
        ApiError::from(e)
    })?;

    let mode = prepared.task.input.mode();
    metrics::record_generation_started(mode);

    // The request id comes from a client header; it is only used for logs
    let video_id = Uuid::new_v4();
    let output = state.service.output_path(video_id);
    let video = state
        .service
        .generate_prepared(&request_id, prepared, &output)
        .await
        .map_err(|e| {
            metrics::record_generation_failed(mode, failure_reason(&e));
            ApiError::from(e)
        })?;

    metrics::record_generation_completed(
        mode,
        video.params.num_frames,
        video.elapsed.as_secs_f64(),
    );

    let video_url = state.config.video_url(&video.file_name);
    info!(request_id = %request_id, video_id = %video_id, video_url = %video_url, "Video ready");

    Ok(Json(GenerateVideoResponse { video_url }))
}

fn failure_reason(err: &WorkerError) -> &'static str {
    if err.is_client_error() {
        "client"
    } else if err.is_checkpoint_error() {
        "checkpoint"
    } else {
        "engine"
    }
}
