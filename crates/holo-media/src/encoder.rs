//! Delivery encoding of engine output.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use holo_models::{ArtifactFormat, EncodingConfig, VideoArtifact};
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Turns a raw engine artifact into a playable file.
#[async_trait]
pub trait VideoEncoder: Send + Sync {
    /// Encode `artifact` to `output` and return the written path.
    async fn encode(
        &self,
        artifact: &VideoArtifact,
        output: &Path,
        encoding: &EncodingConfig,
    ) -> MediaResult<PathBuf>;
}

/// Encoder backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    work_dir: PathBuf,
    runner: FfmpegRunner,
}

impl FfmpegEncoder {
    /// Create an encoder staging intermediate files under `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            runner: FfmpegRunner::new(),
        }
    }

    /// Set a timeout for each encode.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.runner = self.runner.with_timeout(secs);
        self
    }

    /// Build the FFmpeg invocation for one artifact.
    pub fn build_command(
        staged: &Path,
        output: &Path,
        format: &ArtifactFormat,
        encoding: &EncodingConfig,
    ) -> FfmpegCommand {
        let cmd = FfmpegCommand::new(staged, output);
        let cmd = match format {
            ArtifactFormat::RawRgb24 { width, height } => cmd.raw_rgb_input(*width, *height, encoding.fps),
            ArtifactFormat::Container { .. } => cmd,
        };

        cmd.output_args(encoding.to_ffmpeg_args())
            .no_audio()
            .faststart()
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    async fn encode(
        &self,
        artifact: &VideoArtifact,
        output: &Path,
        encoding: &EncodingConfig,
    ) -> MediaResult<PathBuf> {
        if artifact.is_empty() {
            return Err(MediaError::EmptyArtifact);
        }

        tokio::fs::create_dir_all(&self.work_dir).await?;
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let staged = tempfile::Builder::new()
            .prefix("artifact-")
            .suffix(&format!(".{}", artifact.format.extension()))
            .tempfile_in(&self.work_dir)?;
        tokio::fs::write(staged.path(), &artifact.data).await?;
        debug!(
            staged = %staged.path().display(),
            bytes = artifact.data.len(),
            "Staged engine artifact"
        );

        let cmd = Self::build_command(staged.path(), output, &artifact.format, encoding);
        self.runner.run(&cmd).await?;

        if !output.exists() {
            return Err(MediaError::FileNotFound(output.to_path_buf()));
        }

        info!(
            output = %output.display(),
            fps = encoding.fps,
            quality = encoding.quality,
            "Encoded video"
        );

        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_artifact_command() {
        let encoding = EncodingConfig::default();
        let cmd = FfmpegEncoder::build_command(
            Path::new("/tmp/a.rgb"),
            Path::new("/out/v.mp4"),
            &ArtifactFormat::RawRgb24 { width: 832, height: 480 },
            &encoding,
        );
        let args = cmd.build_args();
        assert!(args.contains(&"rawvideo".to_string()));
        assert!(args.contains(&"832x480".to_string()));
        assert!(args.contains(&"-framerate".to_string()));
        assert!(args.contains(&"25".to_string())); // crf for quality 5
        assert!(args.contains(&"+faststart".to_string()));
    }

    #[test]
    fn test_container_artifact_command() {
        let encoding = EncodingConfig::default().with_fps(24);
        let cmd = FfmpegEncoder::build_command(
            Path::new("/tmp/a.mp4"),
            Path::new("/out/v.mp4"),
            &ArtifactFormat::Container {
                extension: "mp4".to_string(),
            },
            &encoding,
        );
        let args = cmd.build_args();
        assert!(!args.contains(&"rawvideo".to_string()));
        let rate_pos = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[rate_pos + 1], "24");
    }

    #[tokio::test]
    async fn test_empty_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = FfmpegEncoder::new(dir.path());
        let artifact = VideoArtifact::new(
            Vec::new(),
            ArtifactFormat::Container {
                extension: "mp4".to_string(),
            },
        );
        let result = encoder
            .encode(&artifact, &dir.path().join("out.mp4"), &EncodingConfig::default())
            .await;
        assert!(matches!(result, Err(MediaError::EmptyArtifact)));
    }
}
