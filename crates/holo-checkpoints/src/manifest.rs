//! Files that must exist before the engine can be constructed.

use std::path::{Path, PathBuf};

use holo_models::model_files::{
    DIT_DIR, HIGH_NOISE_DIT_FILE, LOW_NOISE_DIT_FILE, TEXT_ENCODER_FILE, VAE_FILE, WAN_DIR,
};

/// Hub repository for the Wan 2.2 text encoder and VAE.
pub const WAN_REPO: &str = "Wan-AI/Wan2.2-T2V-A14B";
/// Hub repository for the multi-shot DiT experts.
pub const HOLOCINE_REPO: &str = "hlwang06/HoloCine";

/// One required weight file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointFile {
    /// Hub repository id
    pub repo_id: String,
    /// Path inside the repository
    pub remote_path: String,
    /// Destination on disk
    pub local_path: PathBuf,
}

impl CheckpointFile {
    pub fn exists(&self) -> bool {
        self.local_path.is_file()
    }
}

/// Every file the service needs under `root`.
///
/// Both DiT experts are required so the variant can be switched without a
/// fresh download.
pub fn required_files(root: impl AsRef<Path>) -> Vec<CheckpointFile> {
    let root = root.as_ref();
    let wan = |file: &str| CheckpointFile {
        repo_id: WAN_REPO.to_string(),
        remote_path: file.to_string(),
        local_path: root.join(WAN_DIR).join(file),
    };
    let dit = |file: &str| CheckpointFile {
        repo_id: HOLOCINE_REPO.to_string(),
        remote_path: format!("{}/{}", DIT_DIR, file),
        local_path: root.join(DIT_DIR).join(file),
    };

    vec![
        wan(TEXT_ENCODER_FILE),
        wan(VAE_FILE),
        dit(HIGH_NOISE_DIT_FILE),
        dit(LOW_NOISE_DIT_FILE),
    ]
}

/// Files from `manifest` not present on disk.
pub fn missing_files(manifest: &[CheckpointFile]) -> Vec<&CheckpointFile> {
    manifest.iter().filter(|f| !f.exists()).collect()
}
