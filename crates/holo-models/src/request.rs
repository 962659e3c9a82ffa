//! Generation request shapes.
//!
//! Callers send one flat [`GenerateRequest`]. It is resolved exactly once into
//! a [`GenerationTask`] whose [`GenerationInput`] is either structured
//! (global caption + per-shot captions + frame count) or raw (a single
//! composed prompt). Structured input wins when both are present.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::encoding::{EncodingConfig, DEFAULT_FPS, DEFAULT_QUALITY, MAX_QUALITY};
use crate::error::{RequestError, RequestResult};

/// Default random seed
pub const DEFAULT_SEED: u64 = 0;
/// Default output height in pixels
pub const DEFAULT_HEIGHT: u32 = 480;
/// Default output width in pixels
pub const DEFAULT_WIDTH: u32 = 832;
/// Default number of denoising steps
pub const DEFAULT_INFERENCE_STEPS: u32 = 50;

/// Flat request body accepted by the HTTP API and the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, Validate)]
pub struct GenerateRequest {
    /// Scene-level description (structured mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_caption: Option<String>,

    /// Ordered per-shot captions (structured mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_captions: Option<Vec<String>>,

    /// Already composed prompt (raw mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Target frame count. Required in structured mode.
    #[serde(default, alias = "total_frames", skip_serializing_if = "Option::is_none")]
    pub num_frames: Option<u32>,

    /// Absolute cut indices
    #[serde(default, alias = "custom_shot_cut_frames", skip_serializing_if = "Option::is_none")]
    pub shot_cut_frames: Option<Vec<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 16, max = 4096))]
    pub height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 16, max = 4096))]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 1000))]
    pub num_inference_steps: Option<u32>,

    /// Output frame rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 120))]
    pub fps: Option<u32>,

    /// Output quality 0-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 10))]
    pub quality: Option<u8>,
}

/// Scene description built from a global caption and per-shot captions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StructuredInput {
    pub global_caption: String,
    pub shot_captions: Vec<String>,
    pub total_frames: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_shot_cut_frames: Option<Vec<i64>>,
}

/// Single composed prompt with optional frame fields passed through aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RawInput {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_frames: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_cut_frames: Option<Vec<i64>>,
}

/// Resolved input mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GenerationInput {
    Structured(StructuredInput),
    Raw(RawInput),
}

impl GenerationInput {
    pub fn mode(&self) -> &'static str {
        match self {
            GenerationInput::Structured(_) => "structured",
            GenerationInput::Raw(_) => "raw",
        }
    }
}

/// Options shared by both modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    pub seed: u64,
    pub tiled: bool,
    pub height: u32,
    pub width: u32,
    pub num_inference_steps: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            negative_prompt: None,
            seed: DEFAULT_SEED,
            tiled: true,
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            num_inference_steps: DEFAULT_INFERENCE_STEPS,
        }
    }
}

/// Everything needed to run one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GenerationTask {
    pub input: GenerationInput,
    pub options: GenerationOptions,
    pub encoding: EncodingConfig,
}

impl GenerateRequest {
    /// Validate field ranges and resolve the input mode.
    ///
    /// Empty strings and empty caption lists count as absent.
    pub fn into_task(self) -> RequestResult<GenerationTask> {
        self.validate()?;

        let options = GenerationOptions {
            negative_prompt: self.negative_prompt,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            tiled: self.tiled.unwrap_or(true),
            height: self.height.unwrap_or(DEFAULT_HEIGHT),
            width: self.width.unwrap_or(DEFAULT_WIDTH),
            num_inference_steps: self.num_inference_steps.unwrap_or(DEFAULT_INFERENCE_STEPS),
        };

        let encoding = EncodingConfig::new()
            .with_fps(self.fps.unwrap_or(DEFAULT_FPS))
            .with_quality(self.quality.unwrap_or(DEFAULT_QUALITY).min(MAX_QUALITY));

        let global_caption = self.global_caption.filter(|c| !c.is_empty());
        let shot_captions = self.shot_captions.filter(|s| !s.is_empty());
        let prompt = self.prompt.filter(|p| !p.is_empty());

        let input = match (global_caption, shot_captions, prompt) {
            (Some(global_caption), Some(shot_captions), _) => {
                let total_frames = self.num_frames.ok_or(RequestError::MissingFrameCount)?;
                GenerationInput::Structured(StructuredInput {
                    global_caption,
                    shot_captions,
                    total_frames,
                    custom_shot_cut_frames: self.shot_cut_frames,
                })
            }
            (_, _, Some(prompt)) => GenerationInput::Raw(RawInput {
                prompt,
                num_frames: self.num_frames,
                shot_cut_frames: self.shot_cut_frames,
            }),
            _ => return Err(RequestError::NoPromptSource),
        };

        Ok(GenerationTask {
            input,
            options,
            encoding,
        })
    }
}
