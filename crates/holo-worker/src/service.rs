//! End-to-end generation: validate, ensure weights, infer, encode.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use holo_checkpoints::{CheckpointConfig, CheckpointGate};
use holo_media::{FfmpegEncoder, VideoEncoder};
use holo_models::{build_pipeline_params, GenerateRequest, GenerationTask, PipelineParams};
use holo_pipeline_client::{HttpPipelineClient, InferencePipeline};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::logging::JobLogger;

/// A request that passed validation and is ready to be sent to the engine.
#[derive(Debug, Clone)]
pub struct PreparedGeneration {
    pub task: GenerationTask,
    pub params: PipelineParams,
}

/// Result of one generation.
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    pub request_id: String,
    pub mode: &'static str,
    pub path: PathBuf,
    pub file_name: String,
    pub params: PipelineParams,
    pub elapsed: Duration,
}

/// Resolve and validate a request without touching any collaborator.
pub fn prepare(request: GenerateRequest) -> WorkerResult<PreparedGeneration> {
    let task = request.into_task()?;
    let params = build_pipeline_params(&task.input, &task.options)?;
    Ok(PreparedGeneration { task, params })
}

/// Runs generations against the external pipeline and encoder.
#[derive(Clone)]
pub struct GenerationService {
    pipeline: Arc<dyn InferencePipeline>,
    encoder: Arc<dyn VideoEncoder>,
    checkpoints: Arc<CheckpointGate>,
    output_dir: PathBuf,
}

impl GenerationService {
    pub fn new(
        pipeline: Arc<dyn InferencePipeline>,
        encoder: Arc<dyn VideoEncoder>,
        checkpoints: Arc<CheckpointGate>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pipeline,
            encoder,
            checkpoints,
            output_dir: output_dir.into(),
        }
    }

    /// Wire the HTTP pipeline client, FFmpeg encoder and Hub-backed
    /// checkpoint gate from environment configuration.
    pub fn from_env(worker: &WorkerConfig, checkpoints: &CheckpointConfig) -> WorkerResult<Self> {
        let pipeline = HttpPipelineClient::from_env(&checkpoints.root, checkpoints.dit_variant)?;
        info!(
            url = %pipeline.config().base_url,
            variant = %checkpoints.dit_variant,
            "Inference pipeline configured"
        );
        let encoder = FfmpegEncoder::new(worker.work_dir.clone())
            .with_timeout(worker.encode_timeout.as_secs());
        let gate = CheckpointGate::from_config(checkpoints)?;

        Ok(Self::new(
            Arc::new(pipeline),
            Arc::new(encoder),
            Arc::new(gate),
            worker.output_dir.clone(),
        ))
    }

    pub fn pipeline(&self) -> &Arc<dyn InferencePipeline> {
        &self.pipeline
    }

    pub fn checkpoints(&self) -> &Arc<CheckpointGate> {
        &self.checkpoints
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Location of the encoded video with id `video_id` inside `OUTPUT_DIR`.
    ///
    /// File names are always server-generated ids, never caller-supplied text.
    pub fn output_path(&self, video_id: Uuid) -> PathBuf {
        self.output_dir.join(format!("{}.mp4", video_id))
    }

    /// Generate into `OUTPUT_DIR/<fresh uuid>.mp4`.
    pub async fn generate(&self, request_id: &str, request: GenerateRequest) -> WorkerResult<GeneratedVideo> {
        let prepared = prepare(request)?;
        let output = self.output_path(Uuid::new_v4());
        self.generate_prepared(request_id, prepared, &output).await
    }

    /// Generate into an explicit output path.
    pub async fn generate_to(
        &self,
        request_id: &str,
        request: GenerateRequest,
        output: &Path,
    ) -> WorkerResult<GeneratedVideo> {
        let prepared = prepare(request)?;
        self.generate_prepared(request_id, prepared, output).await
    }

    /// Run an already validated request.
    pub async fn generate_prepared(
        &self,
        request_id: &str,
        prepared: PreparedGeneration,
        output: &Path,
    ) -> WorkerResult<GeneratedVideo> {
        let logger = JobLogger::new(request_id, prepared.task.input.mode());
        let span = logger.create_span();

        self.run(prepared, output, &logger).instrument(span).await
    }

    async fn run(
        &self,
        prepared: PreparedGeneration,
        output: &Path,
        logger: &JobLogger,
    ) -> WorkerResult<GeneratedVideo> {
        let start = Instant::now();
        let PreparedGeneration { task, params } = prepared;

        logger.log_start(&format!(
            "num_frames={:?} shots={} cuts={:?}",
            params.num_frames,
            params.shot_count(),
            params.shot_cut_frames
        ));

        if let Err(e) = self.checkpoints.ensure_ready().await {
            logger.log_error(&e.to_string());
            return Err(e.into());
        }

        logger.log_progress("running inference");
        let artifact = match self.pipeline.generate(&params).await {
            Ok(artifact) => artifact,
            Err(e) => {
                logger.log_error(&e.to_string());
                return Err(e.into());
            }
        };

        logger.log_progress(&format!("encoding {} bytes", artifact.data.len()));
        let path = match self.encoder.encode(&artifact, output, &task.encoding).await {
            Ok(path) => path,
            Err(e) => {
                logger.log_error(&e.to_string());
                return Err(e.into());
            }
        };

        let elapsed = start.elapsed();
        logger.log_completion(&format!("{} in {:.1}s", path.display(), elapsed.as_secs_f64()));

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(GeneratedVideo {
            request_id: logger.request_id().to_string(),
            mode: task.input.mode(),
            path,
            file_name,
            params,
            elapsed,
        })
    }
}

/// Fresh request id.
pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}
