//! On-disk layout of the model weights the engine loads.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Directory (under the checkpoint root) holding the Wan 2.2 base weights.
pub const WAN_DIR: &str = "Wan2.2-T2V-A14B";
/// Directory (under the checkpoint root) holding the multi-shot DiT weights.
pub const DIT_DIR: &str = "HoloCine_dit/full";

pub const TEXT_ENCODER_FILE: &str = "models_t5_umt5-xxl-enc-bf16.pth";
pub const VAE_FILE: &str = "Wan2.1_VAE.pth";
pub const HIGH_NOISE_DIT_FILE: &str = "full_high_noise.safetensors";
pub const LOW_NOISE_DIT_FILE: &str = "full_low_noise.safetensors";

/// Which DiT expert the engine should load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DitVariant {
    #[default]
    HighNoise,
    LowNoise,
}

impl DitVariant {
    pub fn file_name(&self) -> &'static str {
        match self {
            DitVariant::HighNoise => HIGH_NOISE_DIT_FILE,
            DitVariant::LowNoise => LOW_NOISE_DIT_FILE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DitVariant::HighNoise => "high_noise",
            DitVariant::LowNoise => "low_noise",
        }
    }
}

impl std::str::FromStr for DitVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high_noise" | "high" => Ok(DitVariant::HighNoise),
            "low_noise" | "low" => Ok(DitVariant::LowNoise),
            other => Err(format!("unknown DiT variant: {other}")),
        }
    }
}

impl std::fmt::Display for DitVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved weight paths plus placement hints sent with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModelFiles {
    pub text_encoder: PathBuf,
    pub dit: PathBuf,
    pub vae: PathBuf,
    pub device: String,
    pub offload_device: String,
}

impl ModelFiles {
    /// Layout under `root` for the chosen DiT variant.
    pub fn resolve(root: impl AsRef<Path>, variant: DitVariant) -> Self {
        let root = root.as_ref();
        Self {
            text_encoder: root.join(WAN_DIR).join(TEXT_ENCODER_FILE),
            dit: root.join(DIT_DIR).join(variant.file_name()),
            vae: root.join(WAN_DIR).join(VAE_FILE),
            device: "cuda".to_string(),
            offload_device: "cpu".to_string(),
        }
    }

    /// Weight files in load order.
    pub fn paths(&self) -> [&Path; 3] {
        [&self.text_encoder, &self.dit, &self.vae]
    }
}
