//! FFmpeg CLI wrapper for encoding generated videos.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - An async runner with timeout and stderr capture
//! - The [`VideoEncoder`] seam and its FFmpeg implementation

pub mod command;
pub mod encoder;
pub mod error;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use encoder::{FfmpegEncoder, VideoEncoder};
pub use error::{MediaError, MediaResult};
