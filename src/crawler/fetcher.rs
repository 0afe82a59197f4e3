//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Politeness pacing through the shared [`Throttle`]
//! - Retry with exponential backoff for transient failures
//! - Error classification into [`FetchError`]

use crate::config::ScrapingConfig;
use crate::crawler::throttle::Throttle;
use crate::FetchError;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, Span};
use url::Url;

/// Connect timeout ceiling; the overall request timeout still applies
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// URL that was requested
    pub url: String,

    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Page body content
    pub body: String,
}

/// Retry budget and backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self {
            retries: config.retry_attempts,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            backoff_max: Duration::from_millis(config.backoff_max_ms),
        }
    }

    /// Pause before retry number `retry` (1-based)
    ///
    /// `base * 2^(retry - 1)`, capped at `backoff_max`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.backoff_base
            .checked_mul(1u32 << exponent)
            .map_or(self.backoff_max, |pause| pause.min(self.backoff_max))
    }

    /// Maximum number of requests made for one URL
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The scraping configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ScrapingConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for statuses worth retrying
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Paced, retrying page fetcher
///
/// Clones share the HTTP connection pool and the throttle, so request
/// spacing holds across every worker that uses a clone.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    throttle: Arc<Throttle>,
    delay: Duration,
    retry: RetryPolicy,
    span: Span,
}

impl Fetcher {
    /// Creates a fetcher from the scraping configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Pacing, retry and client settings
    /// * `span` - Span every fetch runs under
    pub fn new(config: &ScrapingConfig, span: Span) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            throttle: Arc::new(Throttle::new()),
            delay: Duration::from_millis(config.delay_ms),
            retry: RetryPolicy::from_config(config),
            span,
        })
    }

    /// Fetches a URL with pacing and retry
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Success |
    /// | HTTP 429, 500, 502, 503, 504 | Retry with backoff |
    /// | Timeout | Retry with backoff |
    /// | Connection failure | Retry with backoff |
    /// | Any other status | Immediate → `FetchError::Status` |
    /// | Other network error | Immediate → `FetchError::Network` |
    ///
    /// Every attempt, retries included, first waits for a throttle slot.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `delay_override` - Politeness delay for this call instead of the configured one
    pub async fn fetch(
        &self,
        url: &str,
        delay_override: Option<Duration>,
    ) -> Result<PageContent, FetchError> {
        self.fetch_with_retry(url, delay_override.unwrap_or(self.delay))
            .instrument(self.span.clone())
            .await
    }

    async fn fetch_with_retry(&self, url: &str, delay: Duration) -> Result<PageContent, FetchError> {
        let target = match Url::parse(url) {
            Ok(target) if matches!(target.scheme(), "http" | "https") => target,
            _ => {
                return Err(FetchError::InvalidUrl {
                    url: url.to_string(),
                })
            }
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            self.throttle.acquire(delay).await;
            tracing::debug!("GET {} (attempt {})", url, attempt);

            let failure = match self.client.get(target.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let final_url = response.url().to_string();
                        let body = response.text().await.map_err(|e| FetchError::Body {
                            url: url.to_string(),
                            message: e.to_string(),
                        })?;
                        return Ok(PageContent {
                            url: url.to_string(),
                            final_url,
                            status: status.as_u16(),
                            body,
                        });
                    }

                    let failure = FetchError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                        attempts: attempt,
                    };
                    if !is_retryable_status(status) {
                        return Err(failure);
                    }
                    failure
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    let failure = classify_error(url, &e, attempt);
                    if !retryable {
                        return Err(failure);
                    }
                    failure
                }
            };

            if attempt >= self.retry.max_attempts() {
                return Err(failure);
            }

            let pause = self.retry.backoff(attempt);
            tracing::debug!(
                "{}; retry {}/{} in {:?}",
                failure,
                attempt,
                self.retry.retries,
                pause
            );
            tokio::time::sleep(pause).await;
        }
    }
}

fn classify_error(url: &str, error: &reqwest::Error, attempts: u32) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            attempts,
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
            attempts,
        }
    }
}
