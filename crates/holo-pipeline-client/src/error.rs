//! Pipeline client error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Inference service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Inference request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Transport-level failures that an operator may opt into retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::ServiceUnavailable(_) | PipelineError::Network(_)
        )
    }
}
