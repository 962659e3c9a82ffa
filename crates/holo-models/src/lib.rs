//! Request models and normalization for the multi-shot video service.
//!
//! This crate provides:
//! - Frame-count alignment to the `4t + 1` temporal constraint
//! - Multi-shot prompt assembly and shot-cut placement
//! - The flat request body and its resolution into structured or raw input
//! - Engine parameter assembly
//! - Output encoding settings, engine artifacts and model-file layout

pub mod artifact;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod frames;
pub mod model_files;
pub mod multishot;
pub mod request;

// Re-export common types
pub use artifact::{ArtifactFormat, VideoArtifact};
pub use dispatch::{build_pipeline_params, PipelineParams};
pub use encoding::EncodingConfig;
pub use error::{RequestError, RequestResult};
pub use frames::{align_frame_count, align_frame_index};
pub use model_files::{DitVariant, ModelFiles};
pub use multishot::{build_multishot_request, MultiShotRequest};
pub use request::{
    GenerateRequest, GenerationInput, GenerationOptions, GenerationTask, RawInput, StructuredInput,
};
