//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Install the Prometheus recorder and return a handle for rendering.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "holo_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "holo_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "holo_http_requests_in_flight";

    // Generation metrics
    pub const GENERATIONS_STARTED_TOTAL: &str = "holo_generations_started_total";
    pub const GENERATIONS_COMPLETED_TOTAL: &str = "holo_generations_completed_total";
    pub const GENERATIONS_FAILED_TOTAL: &str = "holo_generations_failed_total";
    pub const GENERATION_DURATION_SECONDS: &str = "holo_generation_duration_seconds";
    pub const GENERATION_FRAMES: &str = "holo_generation_frames";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "holo_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_generation_started(mode: &str) {
    let labels = [("mode", mode.to_string())];
    counter!(names::GENERATIONS_STARTED_TOTAL, &labels).increment(1);
}

pub fn record_generation_completed(mode: &str, num_frames: Option<u32>, duration_secs: f64) {
    let labels = [("mode", mode.to_string())];
    counter!(names::GENERATIONS_COMPLETED_TOTAL, &labels).increment(1);
    histogram!(names::GENERATION_DURATION_SECONDS, &labels).record(duration_secs);
    if let Some(frames) = num_frames {
        histogram!(names::GENERATION_FRAMES, &labels).record(frames as f64);
    }
}

/// Record a failed generation; `reason` is one of client/checkpoint/engine.
pub fn record_generation_failed(mode: &str, reason: &str) {
    let labels = [("mode", mode.to_string()), ("reason", reason.to_string())];
    counter!(names::GENERATIONS_FAILED_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Collapse per-file video paths so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    match path.strip_prefix("/videos/") {
        Some(rest) if !rest.is_empty() => "/videos/:file".to_string(),
        _ => path.to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/videos/3f2a.mp4"), "/videos/:file");
        assert_eq!(sanitize_path("/generate-video"), "/generate-video");
        assert_eq!(sanitize_path("/videos/"), "/videos/");
    }
}
