//! Inference service HTTP client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use holo_models::{ArtifactFormat, DitVariant, ModelFiles, PipelineParams, VideoArtifact};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{GenerateCall, HealthResponse};

/// The external diffusion pipeline: named parameters in, raw video out.
#[async_trait]
pub trait InferencePipeline: Send + Sync {
    /// Run one generation. Potentially long-running; no timeout is imposed
    /// beyond what the implementation is configured with.
    async fn generate(&self, params: &PipelineParams) -> PipelineResult<VideoArtifact>;

    /// Whether the pipeline can currently accept work.
    async fn health_check(&self) -> PipelineResult<bool>;
}

/// Configuration for the pipeline client.
#[derive(Debug, Clone)]
pub struct PipelineClientConfig {
    /// Base URL of the inference service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retries for transport failures (0 propagates the first failure)
    pub max_retries: u32,
}

impl Default for PipelineClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(3600), // multi-shot renders take a while
            max_retries: 0,
        }
    }
}

impl PipelineClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PIPELINE_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            timeout: Duration::from_secs(
                std::env::var("PIPELINE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            max_retries: std::env::var("PIPELINE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        }
    }
}

/// HTTP client for the inference service.
pub struct HttpPipelineClient {
    http: Client,
    config: PipelineClientConfig,
    models: ModelFiles,
}

impl HttpPipelineClient {
    /// Create a new client that asks the engine for the given weights.
    pub fn new(config: PipelineClientConfig, models: ModelFiles) -> PipelineResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PipelineError::Network)?;

        Ok(Self {
            http,
            config,
            models,
        })
    }

    /// Create from environment variables with weights under `checkpoint_root`.
    pub fn from_env(checkpoint_root: impl AsRef<Path>, variant: DitVariant) -> PipelineResult<Self> {
        Self::new(
            PipelineClientConfig::from_env(),
            ModelFiles::resolve(checkpoint_root, variant),
        )
    }

    pub fn config(&self) -> &PipelineClientConfig {
        &self.config
    }

    async fn post_generate(&self, url: &str, call: &GenerateCall) -> PipelineResult<reqwest::Response> {
        let response = self
            .http
            .post(url)
            .json(call)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::SERVICE_UNAVAILABLE => {
                let body = response.text().await.unwrap_or_default();
                Err(PipelineError::ServiceUnavailable(body))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(PipelineError::RequestFailed(format!(
                    "Inference service returned {}: {}",
                    status, body
                )))
            }
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> PipelineError {
        if e.is_timeout() {
            PipelineError::Timeout(self.config.timeout.as_secs())
        } else {
            PipelineError::Network(e)
        }
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> PipelineResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = PipelineResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Inference request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl InferencePipeline for HttpPipelineClient {
    async fn generate(&self, params: &PipelineParams) -> PipelineResult<VideoArtifact> {
        let url = format!("{}/generate", self.config.base_url);
        let call = GenerateCall {
            params: params.clone(),
            models: self.models.clone(),
        };

        debug!(url = %url, num_frames = ?params.num_frames, "Sending generation request");

        let response = self.with_retry(|| self.post_generate(&url, &call)).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let format = ArtifactFormat::from_content_type(&content_type, params.width, params.height);

        let data = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?
            .to_vec();
        if data.is_empty() {
            return Err(PipelineError::InvalidResponse(
                "inference service returned an empty body".to_string(),
            ));
        }

        info!(bytes = data.len(), content_type = %content_type, "Received engine artifact");
        Ok(VideoArtifact::new(data, format))
    }

    async fn health_check(&self) -> PipelineResult<bool> {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.is_healthy())
            }
            Ok(response) => {
                warn!("Inference service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Inference service health check error: {}", e);
                Ok(false)
            }
        }
    }
}
