//! Checkpoint availability for the inference engine.
//!
//! This crate provides:
//! - The manifest of weight files the engine needs
//! - A [`CheckpointFetcher`] seam with a Hugging Face Hub implementation
//! - [`CheckpointGate`], the process-wide readiness state machine

pub mod config;
pub mod error;
pub mod fetcher;
pub mod gate;
pub mod manifest;

pub use config::CheckpointConfig;
pub use error::{CheckpointError, CheckpointResult};
pub use fetcher::{CheckpointFetcher, HfHubFetcher};
pub use gate::{CheckpointGate, CheckpointState};
pub use manifest::{missing_files, required_files, CheckpointFile};
