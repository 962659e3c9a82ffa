//! Output encoding settings for generated videos.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default output frame rate
pub const DEFAULT_FPS: u32 = 15;
/// Default output quality on the 0-10 scale (10 is best)
pub const DEFAULT_QUALITY: u8 = 5;
/// Highest accepted quality value
pub const MAX_QUALITY: u8 = 10;
/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Pixel format for broad player compatibility
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
/// Worst CRF accepted by x264
const MAX_CRF: f64 = 51.0;

/// How the raw pipeline output is written to the final file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Quality 0-10, mapped onto the codec's rate factor
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Video codec
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Output pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}
fn default_quality() -> u8 {
    DEFAULT_QUALITY
}
fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            quality: DEFAULT_QUALITY,
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
        }
    }
}

impl EncodingConfig {
    /// Create a new encoding configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new config with the given frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Returns a new config with the given quality (clamped to 0-10).
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.min(MAX_QUALITY);
        self
    }

    /// Constant rate factor for the configured quality.
    ///
    /// `quality` 10 is lossless-ish (crf 0), `quality` 0 is the worst (crf 51).
    pub fn crf(&self) -> u8 {
        let quality = f64::from(self.quality.min(MAX_QUALITY)) / f64::from(MAX_QUALITY);
        ((1.0 - quality) * MAX_CRF).floor() as u8
    }

    /// Convert to FFmpeg output arguments.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-crf".to_string(),
            self.crf().to_string(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
            "-r".to_string(),
            self.fps.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncodingConfig::default();
        assert_eq!(config.fps, 15);
        assert_eq!(config.quality, 5);
        assert_eq!(config.crf(), 25);
    }

    #[test]
    fn test_quality_bounds() {
        assert_eq!(EncodingConfig::new().with_quality(10).crf(), 0);
        assert_eq!(EncodingConfig::new().with_quality(0).crf(), 51);
        assert_eq!(EncodingConfig::new().with_quality(200).quality, 10);
    }

    #[test]
    fn test_ffmpeg_args() {
        let args = EncodingConfig::default().with_fps(24).to_ffmpeg_args();
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"-crf".to_string()));
        assert!(args.contains(&"25".to_string()));
        assert!(args.contains(&"24".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
    }
}
