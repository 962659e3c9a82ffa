//! Generation worker.
//!
//! This crate provides:
//! - [`GenerationService`], which validates a request, makes sure the
//!   weights are present, runs the engine and encodes the result
//! - Worker configuration and structured per-request logging
//! - The `holo-generate` command line entry point

pub mod config;
pub mod error;
pub mod logging;
pub mod service;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use service::{new_request_id, prepare, GeneratedVideo, GenerationService, PreparedGeneration};
