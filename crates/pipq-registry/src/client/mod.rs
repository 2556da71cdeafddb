//! HTTP client for the package index with connection pooling and retry logic

use std::time::Duration;

use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::debug;
use url::Url;

use crate::api::PackageResponse;
use crate::RegistryResult;
use pipq_core::error::PipqError;

const DEFAULT_BASE_URL: &str = "https://pypi.org/pypi";

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// HTTP client for package index JSON lookups
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base index URL, without a trailing slash
    base_url: String,
}

impl RegistryClient {
    /// Create a new client against the default package index
    pub fn new() -> RegistryResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against an alternate index URL
    pub fn with_base_url(base_url: &str) -> RegistryResult<Self> {
        let parsed = Url::parse(base_url).map_err(|e| {
            PipqError::network(format!("Invalid index URL '{}'", base_url), e)
        })?;

        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            // Request timeout
            .timeout(Duration::from_secs(30))
            // Enable gzip compression
            .gzip(true)
            // User agent
            .user_agent(concat!("pipq/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                PipqError::network("Failed to create HTTP client".to_string(), e)
            })?;

        Ok(Self {
            client,
            retry_config: RetryConfig::default(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Replace the retry configuration
    pub fn retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Execute an operation with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut last_error = None;

        for attempt in 0..=self.retry_config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    // Not-found and decode failures will not improve on retry
                    let retryable = error.is_recoverable();
                    last_error = Some(error);

                    if attempt == self.retry_config.max_retries || !retryable {
                        break;
                    }

                    debug!("retrying index request after {:?}", delay);
                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                },
            }
        }

        Err(last_error.unwrap_or_else(|| PipqError::Network {
            message: "Retry operation failed without error".to_string(),
            source: None,
        }))
    }

    async fn get_json(&self, url: &str, name: &str) -> RegistryResult<PackageResponse> {
        self.with_retry(|| async {
            let response = self.client.get(url).send().await.map_err(|e| {
                PipqError::network(format!("Failed to reach the package index: {}", e), e)
            })?;

            match response.status() {
                StatusCode::OK => response
                    .json::<PackageResponse>()
                    .await
                    .map_err(|e| PipqError::Json {
                        message: e.to_string(),
                    }),
                StatusCode::NOT_FOUND => Err(PipqError::PackageNotFound {
                    name: name.to_string(),
                }),
                StatusCode::SERVICE_UNAVAILABLE => Err(PipqError::ServiceUnavailable),
                status => Err(PipqError::Network {
                    message: format!("Index returned status {} for '{}'", status, name),
                    source: None,
                }),
            }
        })
        .await
    }

    /// Fetch the latest-release metadata and full release list for a package
    pub async fn fetch_package(&self, name: &str) -> RegistryResult<PackageResponse> {
        let url = format!("{}/{}/json", self.base_url, name);
        self.get_json(&url, name).await
    }

    /// Fetch the metadata of one specific release.
    ///
    /// A 404 on the release endpoint is ambiguous, so the bare package is
    /// probed to tell "no such version" apart from "no such package".
    pub async fn fetch_release(
        &self,
        name: &str,
        release: &str,
    ) -> RegistryResult<PackageResponse> {
        let url = format!("{}/{}/{}/json", self.base_url, name, release);
        match self.get_json(&url, name).await {
            Err(PipqError::PackageNotFound { .. }) => {
                self.fetch_package(name).await?;
                Err(PipqError::VersionNotFound {
                    name: name.to_string(),
                    release: release.to_string(),
                })
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests;
