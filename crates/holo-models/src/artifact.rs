//! Raw video output returned by the inference engine.

use serde::{Deserialize, Serialize};

/// Content type the engine uses for packed RGB frames.
pub const RAW_RGB24_CONTENT_TYPE: &str = "video/x-raw-rgb24";

/// How the artifact bytes are laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// A self-describing container (mp4, webm, y4m...).
    Container { extension: String },
    /// Concatenated `width * height * 3` byte frames.
    RawRgb24 { width: u32, height: u32 },
}

impl ArtifactFormat {
    /// Infer the format from a response content type. Raw frames need the
    /// requested dimensions since the bytes carry no header.
    pub fn from_content_type(content_type: &str, width: u32, height: u32) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match mime.as_str() {
            RAW_RGB24_CONTENT_TYPE => ArtifactFormat::RawRgb24 { width, height },
            "video/webm" => ArtifactFormat::Container {
                extension: "webm".to_string(),
            },
            "video/x-yuv4mpeg" | "video/y4m" => ArtifactFormat::Container {
                extension: "y4m".to_string(),
            },
            _ => ArtifactFormat::Container {
                extension: "mp4".to_string(),
            },
        }
    }

    /// File extension used when staging the artifact on disk.
    pub fn extension(&self) -> &str {
        match self {
            ArtifactFormat::Container { extension } => extension,
            ArtifactFormat::RawRgb24 { .. } => "rgb",
        }
    }
}

/// Video produced by one engine call, not yet encoded for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    pub data: Vec<u8>,
    pub format: ArtifactFormat,
}

impl VideoArtifact {
    pub fn new(data: Vec<u8>, format: ArtifactFormat) -> Self {
        Self { data, format }
    }

    /// Frame count for raw artifacts, `None` for containers.
    pub fn raw_frame_count(&self) -> Option<usize> {
        match self.format {
            ArtifactFormat::RawRgb24 { width, height } => {
                let frame_bytes = width as usize * height as usize * 3;
                (frame_bytes > 0).then(|| self.data.len() / frame_bytes)
            }
            ArtifactFormat::Container { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_content_type() {
        assert_eq!(
            ArtifactFormat::from_content_type("video/x-raw-rgb24", 832, 480),
            ArtifactFormat::RawRgb24 { width: 832, height: 480 }
        );
        assert_eq!(
            ArtifactFormat::from_content_type("video/mp4; codecs=avc1", 832, 480).extension(),
            "mp4"
        );
        assert_eq!(ArtifactFormat::from_content_type("", 1, 1).extension(), "mp4");
    }

    #[test]
    fn test_raw_frame_count() {
        let artifact = VideoArtifact::new(
            vec![0u8; 4 * 2 * 3 * 5],
            ArtifactFormat::RawRgb24 { width: 4, height: 2 },
        );
        assert_eq!(artifact.raw_frame_count(), Some(5));
    }
}
