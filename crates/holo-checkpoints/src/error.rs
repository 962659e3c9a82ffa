//! Checkpoint error types.

use std::path::PathBuf;

use thiserror::Error;

pub type CheckpointResult<T> = Result<T, CheckpointError>;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Missing checkpoint files: {}", join_paths(.0))]
    Missing(Vec<PathBuf>),

    #[error("Missing checkpoint files after download: {}", join_paths(.0))]
    StillMissing(Vec<PathBuf>),

    #[error("Checkpoint fetch failed for {repo_id}/{remote_path}: {message}")]
    FetchFailed {
        repo_id: String,
        remote_path: String,
        message: String,
    },

    #[error("Hugging Face Hub error: {0}")]
    Hub(#[from] hf_hub::api::tokio::ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckpointError {
    pub fn fetch_failed(
        repo_id: impl Into<String>,
        remote_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::FetchFailed {
            repo_id: repo_id.into(),
            remote_path: remote_path.into(),
            message: message.into(),
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
