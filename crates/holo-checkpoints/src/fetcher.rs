//! Download of missing checkpoint files.

use std::path::Path;

use async_trait::async_trait;
use hf_hub::api::tokio::{Api, ApiBuilder};
use tracing::{debug, info};

use crate::error::CheckpointResult;
use crate::manifest::CheckpointFile;

/// Obtains one checkpoint file and places it at its local path.
#[async_trait]
pub trait CheckpointFetcher: Send + Sync {
    async fn fetch(&self, file: &CheckpointFile) -> CheckpointResult<()>;
}

/// Fetcher backed by the Hugging Face Hub.
pub struct HfHubFetcher {
    api: Api,
}

impl HfHubFetcher {
    /// Create a fetcher, authenticating with `token` when given.
    pub fn new(token: Option<String>) -> CheckpointResult<Self> {
        let api = ApiBuilder::new()
            .with_token(token)
            .with_progress(false)
            .build()?;
        Ok(Self { api })
    }
}

#[async_trait]
impl CheckpointFetcher for HfHubFetcher {
    async fn fetch(&self, file: &CheckpointFile) -> CheckpointResult<()> {
        info!(
            repo = %file.repo_id,
            file = %file.remote_path,
            "Downloading checkpoint from Hugging Face"
        );

        let repo = self.api.model(file.repo_id.clone());
        let cached = repo.get(&file.remote_path).await?;

        place_cached_file(&cached, &file.local_path).await?;

        info!(path = %file.local_path.display(), "Checkpoint download complete");
        Ok(())
    }
}

/// Put a Hub cache entry at `dest` without duplicating its bytes when the
/// cache and checkpoint root share a filesystem.
///
/// Cache entries are symlinks into the blob store, so the link target is
/// resolved first. Falls back to a copy across filesystems.
pub async fn place_cached_file(cached: &Path, dest: &Path) -> CheckpointResult<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let blob = tokio::fs::canonicalize(cached).await?;
    if tokio::fs::try_exists(dest).await? {
        tokio::fs::remove_file(dest).await?;
    }

    if let Err(e) = tokio::fs::hard_link(&blob, dest).await {
        debug!(error = %e, "Hard link failed, copying checkpoint instead");
        tokio::fs::copy(&blob, dest).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_place_cached_file_follows_symlink_and_shares_blob() {
        let dir = tempfile::tempdir().unwrap();
        let blob = dir.path().join("blobs").join("abc123");
        std::fs::create_dir_all(blob.parent().unwrap()).unwrap();
        std::fs::write(&blob, b"weights").unwrap();

        let snapshot = dir.path().join("snapshots").join("main");
        std::fs::create_dir_all(&snapshot).unwrap();
        let cached = snapshot.join("model.pth");
        std::os::unix::fs::symlink("../../blobs/abc123", &cached).unwrap();

        let dest = dir.path().join("checkpoints").join("Wan").join("model.pth");
        place_cached_file(&cached, &dest).await.unwrap();

        let meta = std::fs::symlink_metadata(&dest).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(std::fs::read(&dest).unwrap(), b"weights");

        use std::os::unix::fs::MetadataExt;
        assert_eq!(meta.ino(), std::fs::metadata(&blob).unwrap().ino());
    }

    #[tokio::test]
    async fn test_place_cached_file_replaces_stale_destination() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("cached.bin");
        std::fs::write(&cached, b"new").unwrap();
        let dest = dir.path().join("dest.bin");
        std::fs::write(&dest, b"old").unwrap();

        place_cached_file(&cached, &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }
}
