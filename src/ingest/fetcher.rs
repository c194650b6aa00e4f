//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made during ingestion:
//! - Building the HTTP client with a descriptive user agent
//! - Pacing every request through a [`Throttle`]
//! - Classifying failures into [`FetchErrorKind`]
//!
//! Fetching is behind the [`Fetcher`] trait so the orchestrator can be driven
//! by canned pages in tests.

use crate::config::UserAgentConfig;
use crate::ingest::pacing::Throttle;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// A failed page fetch
#[derive(Debug, Error)]
#[error("failed to fetch {url}: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// Classification of a fetch failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchErrorKind {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Retrieves the text of a page
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the response body
    ///
    /// Non-2xx responses are errors.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use novel_ingest::config::UserAgentConfig;
/// use novel_ingest::ingest::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "NovelIngest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by reqwest, one paced request at a time
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    throttle: Throttle,
}

impl HttpFetcher {
    pub fn new(client: Client, throttle: Throttle) -> Self {
        Self { client, throttle }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let waited = self.throttle.ready().await;
        debug!("GET {} (waited {}ms)", url, waited.as_millis());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, classify(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchErrorKind::Status(status.as_u16())));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::new(url, FetchErrorKind::Body(e.to_string())))
    }
}

fn classify(error: &reqwest::Error) -> FetchErrorKind {
    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_connect() {
        FetchErrorKind::Connect(error.to_string())
    } else {
        FetchErrorKind::Request(error.to_string())
    }
}
