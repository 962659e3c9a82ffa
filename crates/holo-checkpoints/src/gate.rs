//! Process-wide checkpoint readiness.
//!
//! The gate moves `Uninitialized -> Verifying -> Ready`. A failed
//! verification drops back to `Uninitialized` so a later request retries.
//! Concurrent callers during verification wait for the one in flight instead
//! of starting their own.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::config::CheckpointConfig;
use crate::error::{CheckpointError, CheckpointResult};
use crate::fetcher::{CheckpointFetcher, HfHubFetcher};
use crate::manifest::{missing_files, required_files, CheckpointFile};

/// Lifecycle of the checkpoint gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointState {
    Uninitialized,
    Verifying,
    Ready,
}

impl CheckpointState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointState::Uninitialized => "uninitialized",
            CheckpointState::Verifying => "verifying",
            CheckpointState::Ready => "ready",
        }
    }
}

/// Guards first use of the engine behind a verified set of weights.
pub struct CheckpointGate {
    manifest: Vec<CheckpointFile>,
    fetcher: Arc<dyn CheckpointFetcher>,
    auto_download: bool,
    state: RwLock<CheckpointState>,
    init_lock: Mutex<()>,
}

impl CheckpointGate {
    pub fn new(
        manifest: Vec<CheckpointFile>,
        fetcher: Arc<dyn CheckpointFetcher>,
        auto_download: bool,
    ) -> Self {
        Self {
            manifest,
            fetcher,
            auto_download,
            state: RwLock::new(CheckpointState::Uninitialized),
            init_lock: Mutex::new(()),
        }
    }

    /// Build a gate for `config` using the Hugging Face Hub fetcher.
    pub fn from_config(config: &CheckpointConfig) -> CheckpointResult<Self> {
        let fetcher = HfHubFetcher::new(config.hf_token.clone())?;
        Ok(Self::new(
            required_files(&config.root),
            Arc::new(fetcher),
            config.auto_download,
        ))
    }

    /// Current state.
    pub async fn state(&self) -> CheckpointState {
        *self.state.read().await
    }

    /// Make sure every required file exists, fetching what is missing.
    pub async fn ensure_ready(&self) -> CheckpointResult<()> {
        if self.state().await == CheckpointState::Ready {
            return Ok(());
        }

        let _guard = self.init_lock.lock().await;

        // Another caller may have finished while we waited
        if self.state().await == CheckpointState::Ready {
            return Ok(());
        }

        *self.state.write().await = CheckpointState::Verifying;
        let result = self.verify_and_fetch().await;

        let next = if result.is_ok() {
            CheckpointState::Ready
        } else {
            CheckpointState::Uninitialized
        };
        *self.state.write().await = next;

        result
    }

    async fn verify_and_fetch(&self) -> CheckpointResult<()> {
        let missing = missing_files(&self.manifest);
        if missing.is_empty() {
            info!(files = self.manifest.len(), "All checkpoint files present");
            return Ok(());
        }

        if !self.auto_download {
            return Err(CheckpointError::Missing(
                missing.iter().map(|f| f.local_path.clone()).collect(),
            ));
        }

        info!(missing = missing.len(), "Fetching missing checkpoint files");
        for file in missing {
            if let Err(e) = self.fetcher.fetch(file).await {
                warn!(
                    repo = %file.repo_id,
                    file = %file.remote_path,
                    "Checkpoint fetch failed: {}", e
                );
                return Err(e);
            }
        }

        let still_missing: Vec<_> = missing_files(&self.manifest)
            .iter()
            .map(|f| f.local_path.clone())
            .collect();
        if !still_missing.is_empty() {
            return Err(CheckpointError::StillMissing(still_missing));
        }

        info!("Checkpoint files verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Writes a placeholder file for each fetch.
    struct WritingFetcher {
        calls: AtomicUsize,
        skip: Option<String>,
    }

    impl WritingFetcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                skip: None,
            }
        }

        fn skipping(remote_path: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                skip: Some(remote_path.to_string()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CheckpointFetcher for WritingFetcher {
        async fn fetch(&self, file: &CheckpointFile) -> CheckpointResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.skip.as_deref() == Some(file.remote_path.as_str()) {
                return Ok(());
            }
            tokio::fs::create_dir_all(file.local_path.parent().unwrap()).await?;
            tokio::fs::write(&file.local_path, b"weights").await?;
            Ok(())
        }
    }

    struct FailingFetcher;

    #[async_trait::async_trait]
    impl CheckpointFetcher for FailingFetcher {
        async fn fetch(&self, file: &CheckpointFile) -> CheckpointResult<()> {
            Err(CheckpointError::fetch_failed(
                &file.repo_id,
                &file.remote_path,
                "network unreachable",
            ))
        }
    }

    #[tokio::test]
    async fn test_downloads_missing_then_ready() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(WritingFetcher::new());
        let gate = CheckpointGate::new(required_files(dir.path()), fetcher.clone(), true);

        assert_eq!(gate.state().await, CheckpointState::Uninitialized);
        gate.ensure_ready().await.unwrap();
        assert_eq!(gate.state().await, CheckpointState::Ready);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);

        // Ready is sticky
        gate.ensure_ready().await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_verify_once() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(WritingFetcher::new());
        let gate = Arc::new(CheckpointGate::new(
            required_files(dir.path()),
            fetcher.clone(),
            true,
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                tokio::spawn(async move { gate.ensure_ready().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_still_missing_after_download() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(WritingFetcher::skipping(
            "HoloCine_dit/full/full_low_noise.safetensors",
        ));
        let gate = CheckpointGate::new(required_files(dir.path()), fetcher, true);

        let err = gate.ensure_ready().await.unwrap_err();
        match err {
            CheckpointError::StillMissing(paths) => {
                assert_eq!(paths.len(), 1);
                assert!(paths[0].ends_with("full_low_noise.safetensors"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(gate.state().await, CheckpointState::Uninitialized);
    }

    #[tokio::test]
    async fn test_failure_returns_to_uninitialized_and_retries() {
        let dir = tempfile::tempdir().unwrap();
        let gate = CheckpointGate::new(required_files(dir.path()), Arc::new(FailingFetcher), true);

        assert!(gate.ensure_ready().await.is_err());
        assert_eq!(gate.state().await, CheckpointState::Uninitialized);
        assert!(matches!(
            gate.ensure_ready().await,
            Err(CheckpointError::FetchFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_auto_download_lists_missing() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(WritingFetcher::new());
        let gate = CheckpointGate::new(required_files(dir.path()), fetcher.clone(), false);

        let err = gate.ensure_ready().await.unwrap_err();
        assert!(matches!(err, CheckpointError::Missing(ref paths) if paths.len() == 4));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }
}
