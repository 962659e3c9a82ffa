//! Axum HTTP API for multi-shot video generation.
//!
//! This crate provides:
//! - `POST /generate-video` backed by the worker's generation service
//! - Static serving of encoded videos under `/videos/`
//! - Liveness/readiness probes, per-IP rate limiting and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
