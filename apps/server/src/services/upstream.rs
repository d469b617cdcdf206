//! Upstream product sources for the refresh path.
//!
//! How the upstream publishes its data is outside this crate; a source only has
//! to hand back the raw product rows. Two sources ship here: a JSON file on disk
//! and a JSON document served over HTTP.

use crate::{config::IngestConfig, services::ingest::RawProduct, Error, Result};
use async_trait::async_trait;
use std::{path::PathBuf, sync::Arc, time::Duration};

#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &str;

    /// Every product the upstream currently publishes.
    async fn fetch_products(&self) -> Result<Vec<RawProduct>>;
}

/// Products read from a JSON array on disk.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl UpstreamSource for JsonFileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_products(&self) -> Result<Vec<RawProduct>> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Products fetched with a GET request returning a JSON array.
pub struct HttpJsonSource {
    client: reqwest::Client,
    url: String,
}

impl HttpJsonSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coverage-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Upstream(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl UpstreamSource for HttpJsonSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_products(&self) -> Result<Vec<RawProduct>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Upstream(format!("GET {}: {e}", self.url)))?;

        response
            .json::<Vec<RawProduct>>()
            .await
            .map_err(|e| Error::Upstream(format!("decoding {}: {e}", self.url)))
    }
}

/// Source configured under `ingest`; the URL wins when both are set.
pub fn source_from_config(config: &IngestConfig) -> Result<Option<Arc<dyn UpstreamSource>>> {
    if let Some(url) = config.upstream_url.as_deref().filter(|u| !u.is_empty()) {
        let timeout = Duration::from_secs(config.request_timeout_seconds);
        return Ok(Some(Arc::new(HttpJsonSource::new(url, timeout)?)));
    }
    if let Some(path) = config.upstream_file.as_deref().filter(|p| !p.is_empty()) {
        return Ok(Some(Arc::new(JsonFileSource::new(path))));
    }
    Ok(None)
}
