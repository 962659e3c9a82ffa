//! Checkpoint configuration.

use std::path::PathBuf;

use holo_models::DitVariant;

/// Where weights live and how missing ones are obtained.
#[derive(Debug, Clone)]
pub struct CheckpointConfig {
    /// Root directory of all checkpoints
    pub root: PathBuf,
    /// DiT expert the engine loads
    pub dit_variant: DitVariant,
    /// Fetch missing files instead of failing immediately
    pub auto_download: bool,
    /// Hugging Face access token
    pub hf_token: Option<String>,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./checkpoints"),
            dit_variant: DitVariant::HighNoise,
            auto_download: true,
            hf_token: None,
        }
    }
}

impl CheckpointConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            root: std::env::var("CHECKPOINT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./checkpoints")),
            dit_variant: std::env::var("DIT_VARIANT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            auto_download: std::env::var("CHECKPOINT_AUTO_DOWNLOAD")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            hf_token: std::env::var("HF_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
        }
    }
}
