//! API integration tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use holo_api::{create_router, ApiConfig, AppState};
use holo_checkpoints::{required_files, CheckpointFetcher, CheckpointFile, CheckpointGate, CheckpointResult};
use holo_media::{MediaResult, VideoEncoder};
use holo_models::{ArtifactFormat, EncodingConfig, PipelineParams, VideoArtifact};
use holo_pipeline_client::{InferencePipeline, PipelineResult};
use holo_worker::GenerationService;

#[derive(Default)]
struct FakePipeline {
    calls: Mutex<Vec<PipelineParams>>,
}

#[async_trait]
impl InferencePipeline for FakePipeline {
    async fn generate(&self, params: &PipelineParams) -> PipelineResult<VideoArtifact> {
        self.calls.lock().unwrap().push(params.clone());
        Ok(VideoArtifact::new(
            b"fake mp4".to_vec(),
            ArtifactFormat::Container {
                extension: "mp4".to_string(),
            },
        ))
    }

    async fn health_check(&self) -> PipelineResult<bool> {
        Ok(true)
    }
}

struct WriteThroughEncoder;

#[async_trait]
impl VideoEncoder for WriteThroughEncoder {
    async fn encode(
        &self,
        artifact: &VideoArtifact,
        output: &Path,
        _encoding: &EncodingConfig,
    ) -> MediaResult<PathBuf> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, &artifact.data).await?;
        Ok(output.to_path_buf())
    }
}

struct LocalFetcher;

#[async_trait]
impl CheckpointFetcher for LocalFetcher {
    async fn fetch(&self, file: &CheckpointFile) -> CheckpointResult<()> {
        if let Some(parent) = file.local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file.local_path, b"weights").await?;
        Ok(())
    }
}

struct TestApp {
    dir: tempfile::TempDir,
    router: Router,
    pipeline: Arc<FakePipeline>,
}

fn create_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Arc::new(FakePipeline::default());
    let gate = CheckpointGate::new(
        required_files(dir.path().join("checkpoints")),
        Arc::new(LocalFetcher),
        true,
    );
    let service = GenerationService::new(
        pipeline.clone(),
        Arc::new(WriteThroughEncoder),
        Arc::new(gate),
        dir.path().join("outputs"),
    );
    let config = ApiConfig {
        public_base_url: "http://holo.test".to_string(),
        ..Default::default()
    };

    TestApp {
        dir,
        router: create_router(AppState::new(config, service), None),
        pipeline,
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_healthz_endpoint() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_checkpoint_state() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["checks"]["engine"]["status"], "ok");
    assert_eq!(body["checks"]["checkpoints"]["status"], "uninitialized");
}

#[tokio::test]
async fn test_generate_without_prompt_source_is_bad_request() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(post_json("/generate-video", json!({ "seed": 3 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("no valid prompt source"));
    assert!(app.pipeline.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_structured_without_frames_never_reaches_engine() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(post_json(
            "/generate-video",
            json!({
                "global_caption": "A rainy city at night.",
                "shot_captions": ["wide street", "close-up on a face"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("frame count"));
    assert!(app.pipeline.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/generate-video")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn test_generate_structured_returns_video_url() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/generate-video")
                .header("content-type", "application/json")
                .header("x-request-id", "req-42")
                .body(Body::from(
                    json!({
                        "global_caption": "Two friends at a diner.",
                        "shot_captions": ["a", "b", "c"],
                        "total_frames": 97
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let video_url = body["videoUrl"].as_str().unwrap();
    let file_name = video_url
        .strip_prefix("http://holo.test/videos/")
        .unwrap()
        .to_string();
    let video_id = file_name.strip_suffix(".mp4").unwrap();
    assert!(uuid::Uuid::parse_str(video_id).is_ok());

    {
        let calls = app.pipeline.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].num_frames, Some(97));
        assert_eq!(calls[0].shot_cut_frames, Some(vec![33, 65]));
        assert!(calls[0].prompt.starts_with("[global caption] Two friends at a diner. This scene contains 3 shots."));
    }

    let video = app
        .router
        .oneshot(
            Request::builder()
                .uri(format!("/videos/{}", file_name))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(video.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(video.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"fake mp4");
}

#[tokio::test]
async fn test_generate_raw_prompt_aligns_frames() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(post_json(
            "/generate-video",
            json!({
                "prompt": "[global caption] g [per shot caption] a [shot cut] b",
                "num_frames": 100,
                "shot_cut_frames": [50]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let calls = app.pipeline.calls.lock().unwrap();
    assert_eq!(calls[0].num_frames, Some(101));
    assert_eq!(calls[0].shot_cut_frames, Some(vec![49]));
}

#[tokio::test]
async fn test_rate_limiting_per_client() {
    let app = create_test_app();

    let mut limited = false;
    for _ in 0..5 {
        let mut request = post_json("/generate-video", json!({}));
        request
            .headers_mut()
            .insert("x-forwarded-for", "192.168.1.100".parse().unwrap());
        let response = app.router.clone().oneshot(request).await.unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited = true;
            break;
        }
    }

    assert!(limited);
}

#[tokio::test]
async fn test_request_id_header_cannot_choose_output_path() {
    let app = create_test_app();
    let outside = app.dir.path().join("escaped");

    for _ in 0..2 {
        let mut request = post_json("/generate-video", json!({ "prompt": "a cat" }));
        request
            .headers_mut()
            .insert("x-request-id", outside.to_str().unwrap().parse().unwrap());

        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["x-request-id"],
            outside.to_str().unwrap()
        );
    }

    assert!(!outside.with_extension("mp4").exists());

    let mut videos = std::fs::read_dir(app.dir.path().join("outputs"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    videos.sort();
    videos.dedup();
    assert_eq!(videos.len(), 2);
}
