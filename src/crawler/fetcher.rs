//! HTTP fetcher with bounded retry
//!
//! One GET per attempt, a per-request timeout, and a fixed delay
//! between attempts. Only timeouts are retried; everything else is
//! terminal for the URL. Exhausting all attempts abandons the URL with
//! a logged reason, never the whole crawl.
//!
//! Retry behavior:
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Timeout | Retry up to `attempts` times, fixed delay |
//! | HTTP 403 / 404 | Abandon immediately |
//! | Other non-2xx | Abandon immediately |
//! | Transport error | Abandon immediately |

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Browser-like user agent; some sites reject obvious bots outright
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// How a URL fetch failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {attempts} attempt(s)")]
    TimedOut { attempts: u32 },

    #[error("resource unavailable (HTTP {status})")]
    Denied { status: u16 },

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),
}

/// Bounded retry policy: fixed attempt count, fixed delay
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        // At least one attempt or nothing would ever be fetched
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

/// A successfully fetched HTML page
#[derive(Debug)]
pub struct FetchedPage {
    /// URL after redirects; relative links resolve against this
    pub final_url: Url,
    pub body: String,
}

/// Builds the HTTP client shared by page fetches and downloads
///
/// Constructed once per crawl run and passed by reference; never a
/// process-wide singleton.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches an HTML page with the retry policy applied
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    policy: &RetryPolicy,
    timeout: Duration,
) -> Result<FetchedPage, FetchError> {
    let response = fetch_response(client, url, policy, timeout).await?;
    let final_url = response.url().clone();
    let body = response
        .text()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    Ok(FetchedPage { final_url, body })
}

/// Fetches a binary payload with the retry policy applied
pub async fn fetch_bytes(
    client: &Client,
    url: &Url,
    policy: &RetryPolicy,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    let response = fetch_response(client, url, policy, timeout).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    Ok(bytes.to_vec())
}

async fn fetch_response(
    client: &Client,
    url: &Url,
    policy: &RetryPolicy,
    timeout: Duration,
) -> Result<Response, FetchError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match client.get(url.clone()).timeout(timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND {
                    return Err(FetchError::Denied {
                        status: status.as_u16(),
                    });
                }
                if !status.is_success() {
                    return Err(FetchError::Status {
                        status: status.as_u16(),
                    });
                }
                return Ok(response);
            }
            Err(e) if e.is_timeout() => {
                if attempt >= policy.attempts {
                    return Err(FetchError::TimedOut { attempts: attempt });
                }
                tracing::debug!(
                    "Timeout fetching {} (attempt {}/{}), retrying",
                    url,
                    attempt,
                    policy.attempts
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(FetchError::Transport(e.to_string())),
        }
    }
}
