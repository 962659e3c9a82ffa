//! Inference service request/response types.

use holo_models::{ModelFiles, PipelineParams};
use serde::{Deserialize, Serialize};

/// Body of one `/generate` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateCall {
    /// Engine parameters, flattened into the top level
    #[serde(flatten)]
    pub params: PipelineParams,
    /// Weights the engine should have loaded
    pub models: ModelFiles,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" || self.status == "ok"
    }
}
