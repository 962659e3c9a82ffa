//! Request validation errors.

use thiserror::Error;

pub type RequestResult<T> = Result<T, RequestError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("missing required frame count for structured input")]
    MissingFrameCount,

    #[error("no valid prompt source: provide global_caption + shot_captions + num_frames, or prompt")]
    NoPromptSource,

    #[error("assembled parameters contain no prompt")]
    EmptyPrompt,

    #[error("invalid request: {0}")]
    Validation(String),
}

impl RequestError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the error stems from the caller's input (as opposed to an
    /// inconsistency discovered after assembly).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RequestError::MissingFrameCount | RequestError::Validation(_)
        )
    }

    /// Whether no usable prompt source could be found.
    pub fn is_configuration(&self) -> bool {
        matches!(self, RequestError::NoPromptSource | RequestError::EmptyPrompt)
    }
}

impl From<validator::ValidationErrors> for RequestError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
