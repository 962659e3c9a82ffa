//! Application state.

use std::sync::Arc;

use holo_checkpoints::CheckpointConfig;
use holo_worker::{GenerationService, WorkerConfig, WorkerResult};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub service: Arc<GenerationService>,
}

impl AppState {
    pub fn new(config: ApiConfig, service: GenerationService) -> Self {
        Self {
            config,
            service: Arc::new(service),
        }
    }

    /// Build state with the HTTP pipeline client, FFmpeg encoder and
    /// checkpoint gate configured from the environment.
    pub fn from_env(config: ApiConfig) -> WorkerResult<Self> {
        let service =
            GenerationService::from_env(&WorkerConfig::from_env(), &CheckpointConfig::from_env())?;
        Ok(Self::new(config, service))
    }
}
