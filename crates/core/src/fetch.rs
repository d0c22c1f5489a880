use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::board::StatusReport;
use crate::config::{AppConfig, SourcesConfig};
use crate::errors::FetchError;
use crate::region::Region;

/// Transport that retrieves the raw body of a status endpoint.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest`-backed source. The client carries the per-request timeout, so a
/// single GET never blocks longer than the configured bound.
#[derive(Clone, Debug)]
pub struct HttpStatusSource {
    client: Client,
    timeout: Duration,
}

impl HttpStatusSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bluelight/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| FetchError::Client(error.to_string()))?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout { timeout_secs: self.timeout.as_secs() }
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|error| self.classify(error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown status").to_owned(),
            });
        }

        let bytes = response.bytes().await.map_err(|error| self.classify(error))?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FetchError::Decode)
    }
}

/// Fetches one region's status and folds every failure into the report.
#[derive(Clone)]
pub struct StatusFetcher {
    source: Arc<dyn StatusSource>,
    sources: SourcesConfig,
}

impl StatusFetcher {
    pub fn new(source: Arc<dyn StatusSource>, sources: SourcesConfig) -> Self {
        Self { source, sources }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let source = HttpStatusSource::new(config.fetch.timeout())?;
        Ok(Self::new(Arc::new(source), config.sources.clone()))
    }

    pub fn sources(&self) -> &SourcesConfig {
        &self.sources
    }

    pub async fn fetch_status(&self, region: Region) -> StatusReport {
        let url = self.sources.url_for(region);

        match self.source.get_text(url).await {
            Ok(body) => {
                let status = body.trim();
                debug!(
                    event_name = "status.fetch.succeeded",
                    region = %region,
                    status = status,
                    "status fetched"
                );
                StatusReport::status(region, status)
            }
            Err(error) => {
                warn!(
                    event_name = "status.fetch.failed",
                    region = %region,
                    url = url,
                    error = %error,
                    "status fetch failed"
                );
                StatusReport::failed(region, error.to_string())
            }
        }
    }
}
