//! Page fetching.

use std::time::Duration;

use async_trait::async_trait;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A failed page retrieval, tagged with the URL it was for.
#[derive(Debug, Clone)]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fetch of {} failed: {}", self.url, self.reason)
    }
}

impl std::error::Error for FetchError {}

/// Retrieves raw markup for a URL. No parsing, no caching.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// One GET, no retries. Transport failures and non-2xx statuses are
    /// both fetch failures.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Production fetcher on a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// `timeout` bounds each whole request so one hung page cannot stall a
    /// cycle indefinitely.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let tag = |e: reqwest::Error| FetchError {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(tag)?;
        let response = response.error_for_status().map_err(tag)?;
        response.text().await.map_err(tag)
    }
}
