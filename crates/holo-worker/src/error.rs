//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0}")]
    Request(#[from] holo_models::RequestError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] holo_checkpoints::CheckpointError),

    #[error("Inference failed: {0}")]
    Pipeline(#[from] holo_pipeline_client::PipelineError),

    #[error("Encoding failed: {0}")]
    Media(#[from] holo_media::MediaError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether the caller's request was at fault. These are raised before
    /// any external call is made.
    pub fn is_client_error(&self) -> bool {
        matches!(self, WorkerError::Request(_))
    }

    /// Whether the weights could not be made available.
    pub fn is_checkpoint_error(&self) -> bool {
        matches!(self, WorkerError::Checkpoint(_))
    }
}
