//! HTTP client for downloading vendor files.

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use rosabar_types::HistoryError;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Configuration for the download client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum concurrent downloads.
    pub concurrency: usize,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for failed requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout: Duration::from_secs(60),
            max_retries: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            user_agent: format!("rosabar/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Errors that can occur during downloads.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status.
    #[error("Server error: {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },
}

impl From<DownloadError> for HistoryError {
    fn from(err: DownloadError) -> Self {
        Self::Http(err.to_string())
    }
}

/// HTTP client with connection pooling and retry logic.
#[derive(Debug, Clone)]
pub struct DownloadClient {
    client: Client,
    config: ClientConfig,
}

impl DownloadClient {
    /// Creates a new download client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_max_idle_per_host(config.concurrency)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Downloads a single file.
    ///
    /// Returns `Ok(None)` if the file does not exist (404) or is empty. The
    /// vendor serves empty candle files for days without quotes.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails after all retries.
    pub async fn download(&self, url: &str) -> Result<Option<Bytes>, DownloadError> {
        let mut attempts = 0;

        loop {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        debug!(url, "not found");
                        return Ok(None);
                    }

                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        if attempts < self.config.max_retries {
                            attempts += 1;
                            warn!(url, %status, attempt = attempts, "retrying download");
                            tokio::time::sleep(self.backoff_delay(attempts)).await;
                            continue;
                        }
                        return Err(DownloadError::ServerError {
                            status: status.as_u16(),
                        });
                    }

                    response.error_for_status_ref()?;
                    let body = response.bytes().await?;
                    return Ok(Some(body).filter(|b| !b.is_empty()));
                }
                Err(e) if Self::is_retryable(&e) && attempts < self.config.max_retries => {
                    attempts += 1;
                    warn!(url, error = %e, attempt = attempts, "retrying download");
                    tokio::time::sleep(self.backoff_delay(attempts)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Downloads several files with the configured concurrency.
    ///
    /// Results are returned in the order of `urls`.
    pub async fn download_all<S: AsRef<str>>(&self, urls: &[S]) -> Vec<Result<Option<Bytes>, DownloadError>> {
        stream::iter(urls)
            .map(|url| self.download(url.as_ref()))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    /// Exponential backoff capped at the configured maximum, with a
    /// deterministic jitter of up to ±25%.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10))
            .min(self.config.max_delay_ms);

        let jitter_range = delay / 4;
        let delay = if jitter_range > 0 {
            let offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            (delay + offset).saturating_sub(jitter_range)
        } else {
            delay
        };
        Duration::from_millis(delay.max(100))
    }

    fn is_retryable(error: &reqwest::Error) -> bool {
        if error.is_builder() {
            return false;
        }
        error.is_timeout() || error.is_connect() || error.is_request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.user_agent.starts_with("rosabar/"));
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = DownloadClient::with_defaults();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_download_all_empty() {
        let client = DownloadClient::with_defaults().unwrap();
        let urls: [&str; 0] = [];
        assert!(client.download_all(&urls).await.is_empty());
    }

    #[test]
    fn test_backoff_delay() {
        let client = DownloadClient::with_defaults().unwrap();

        let delay1 = client.backoff_delay(1);
        assert!(delay1.as_millis() >= 750 && delay1.as_millis() <= 1250);

        let delay2 = client.backoff_delay(2);
        assert!(delay2.as_millis() >= 1500 && delay2.as_millis() <= 2500);

        let delay_high = client.backoff_delay(20);
        assert!(delay_high.as_millis() <= 37_500);
    }

    #[test]
    fn test_error_conversion() {
        let err: HistoryError = DownloadError::ServerError { status: 503 }.into();
        assert!(matches!(err, HistoryError::Http(ref msg) if msg.contains("503")));
    }
}
