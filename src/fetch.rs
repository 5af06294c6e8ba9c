//! HTTP transport used by the link discoverer and the article extractor.
//!
//! The crawl only needs one capability from the network: turn a URL into page
//! text, or fail. [`Fetch`] captures that so the rest of the crate can be
//! exercised against canned pages, and [`HttpFetcher`] implements it with
//! `reqwest`.
//!
//! Every request carries a browser-like header set and a fixed timeout. A
//! non-2xx status is reported as [`FetchError::Status`]; the callers decide
//! what a failure means for them.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument};

/// Default `User-Agent`; the archive rejects obvious bots with 403.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Errors produced while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    /// Connection failure, timeout, or body read error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A header value could not be encoded.
    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

/// Something that can fetch a page by URL.
pub trait Fetch {
    /// Fetch `url` and return the response body as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure or a non-success status.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`Fetch`] implementation backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given `User-Agent` and per-request timeout.
    ///
    /// # Errors
    ///
    /// Fails if the user agent is not a valid header value or the TLS
    /// backend cannot be initialized.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "Non-success status");
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}
