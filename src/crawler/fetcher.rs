//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Lazy client construction with timeout and user agent
//! - Retry with linear backoff for transport-level failures
//! - Immediate errors for HTTP statuses >= 400
//! - A global semaphore bounding concurrent in-flight requests

use crate::config::Config;
use crate::FetchError;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Multiplied by the retry index for transport-level backoff
const BASE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Raw result of a successful fetch.
///
/// Created per network call and consumed immediately by the extractor;
/// never persisted.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Raw page body
    pub content: String,

    /// HTTP status code
    pub status: u16,

    /// Final URL after redirects
    pub url: String,
}

/// HTTP fetcher with retry, timeout, and bounded concurrency
///
/// The underlying client is created lazily by `start` (or on first fetch)
/// and released by `close`; both are idempotent. The semaphore is sized to
/// the configured capacity even though the sequential orchestrator keeps at
/// most one request in flight, so the fetcher stays correct if callers ever
/// issue concurrent fetches.
pub struct PageFetcher {
    base_url: Url,
    user_agent: String,
    timeout: Duration,
    max_retries: u32,
    client: Option<Client>,
    semaphore: Arc<Semaphore>,
    request_count: AtomicU64,
}

impl PageFetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(config: &Config) -> crate::Result<Self> {
        let base_url = Url::parse(&config.site.base_url)?;

        Ok(Self {
            base_url,
            user_agent: config.site.user_agent.clone(),
            timeout: Duration::from_secs(config.crawler.request_timeout),
            max_retries: config.crawler.max_retries,
            client: None,
            semaphore: Arc::new(Semaphore::new(config.crawler.max_concurrent_requests)),
            request_count: AtomicU64::new(0),
        })
    }

    /// Builds the HTTP client if it does not exist yet. Idempotent.
    pub fn start(&mut self) -> crate::Result<()> {
        if self.client.is_none() {
            let client = Client::builder()
                .user_agent(self.user_agent.clone())
                .timeout(self.timeout)
                .connect_timeout(self.timeout)
                .gzip(true)
                .brotli(true)
                .build()?;
            self.client = Some(client);
            tracing::debug!("HTTP client started");
        }
        Ok(())
    }

    /// Releases the HTTP client. Safe to call when never started.
    pub fn close(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!("HTTP client closed");
        }
    }

    /// True once the underlying client exists
    pub fn is_started(&self) -> bool {
        self.client.is_some()
    }

    /// Number of `fetch` invocations since construction
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Fetches a URL with the configured number of attempts
    pub async fn fetch(&mut self, url: &str) -> Result<FetchResult, FetchError> {
        let retries = self.max_retries;
        self.fetch_with_retries(url, retries).await
    }

    /// Fetches a URL, retrying transport failures with linear backoff
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP status >= 400 | Immediate error carrying the status |
    /// | Connect error / timeout | Retry; before retry k, wait k seconds |
    /// | All attempts exhausted | Error wrapping the last transport failure, status unset |
    ///
    /// A concurrency permit is held for the whole call, backoff included,
    /// and released on completion whether the fetch succeeded or failed.
    pub async fn fetch_with_retries(
        &mut self,
        url: &str,
        retries: u32,
    ) -> Result<FetchResult, FetchError> {
        if self.client.is_none() {
            self.start().map_err(|e| FetchError {
                url: url.to_string(),
                status: None,
                message: format!("failed to start HTTP client: {}", e),
            })?;
        }

        self.request_count.fetch_add(1, Ordering::Relaxed);

        // The clone is cheap: reqwest clients share their connection pool.
        let client = match &self.client {
            Some(c) => c.clone(),
            None => {
                return Err(FetchError {
                    url: url.to_string(),
                    status: None,
                    message: "HTTP client not started".to_string(),
                })
            }
        };

        let _permit = self.semaphore.acquire().await.map_err(|_| FetchError {
            url: url.to_string(),
            status: None,
            message: "fetcher shut down".to_string(),
        })?;

        let mut last_error: Option<reqwest::Error> = None;

        for attempt in 0..retries {
            if attempt > 0 {
                let delay = BASE_RETRY_DELAY * attempt;
                tracing::debug!(
                    "Transport failure fetching {}, retrying in {:?} (attempt {}/{})",
                    url,
                    delay,
                    attempt + 1,
                    retries
                );
                tokio::time::sleep(delay).await;
            }

            match client.get(url).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let final_url = response.url().to_string();

                    if status >= 400 {
                        return Err(FetchError {
                            url: final_url,
                            status: Some(status),
                            message: format!("HTTP error {}", status),
                        });
                    }

                    match response.text().await {
                        Ok(content) => {
                            return Ok(FetchResult {
                                content,
                                status,
                                url: final_url,
                            })
                        }
                        Err(e) => last_error = Some(e),
                    }
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(FetchError {
            url: url.to_string(),
            status: None,
            message: format!(
                "Failed after {} attempts: {}",
                retries,
                last_error
                    .as_ref()
                    .map(describe_transport_error)
                    .unwrap_or_else(|| "no attempts were made".to_string())
            ),
        })
    }

    /// Fetches a page relative to the configured site base
    ///
    /// Joins `path` onto the base URL and fails unless the response status
    /// is exactly 200.
    pub async fn fetch_site_page(&mut self, path: &str) -> Result<String, FetchError> {
        let url = self.base_url.join(path).map_err(|e| FetchError {
            url: path.to_string(),
            status: None,
            message: format!("invalid page path: {}", e),
        })?;

        let result = self.fetch(url.as_str()).await?;
        if result.status != 200 {
            return Err(FetchError {
                url: result.url,
                status: Some(result.status),
                message: format!("site returned {}", result.status),
            });
        }
        Ok(result.content)
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
