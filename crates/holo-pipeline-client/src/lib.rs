//! Client for the external multi-shot diffusion inference service.
//!
//! The engine itself (weights, VRAM management, denoising) lives in a
//! separate process. This crate exposes it behind the [`InferencePipeline`]
//! seam: one call taking the assembled parameters and returning the raw
//! video artifact.

pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpPipelineClient, InferencePipeline, PipelineClientConfig};
pub use error::{PipelineError, PipelineResult};
pub use types::{GenerateCall, HealthResponse};
