//! Structured generation logging.

use tracing::{error, info, warn, Span};

/// Logger carrying the request id and operation on every event.
#[derive(Debug, Clone)]
pub struct JobLogger {
    request_id: String,
    operation: String,
}

impl JobLogger {
    /// Create a logger for one request.
    pub fn new(request_id: &str, operation: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Generation started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Generation progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Generation warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Generation error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Generation completed: {}", message
        );
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span grouping all events of this request.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "generation",
            request_id = %self.request_id,
            operation = %self.operation
        )
    }
}
