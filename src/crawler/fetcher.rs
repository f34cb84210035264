//! HTTP page fetching with identity fallback
//!
//! This module handles all website requests made by the contact crawler:
//! - The [`PageFetcher`] seam, so tests can serve pages from memory
//! - A reqwest-backed fetcher that follows redirects and classifies errors
//! - Trying a fixed list of browser identities until one succeeds

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a single page request failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },
}

/// Headers presented to a website for one request attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserIdentity {
    pub name: &'static str,
    pub user_agent: &'static str,
    pub accept: Option<&'static str>,
}

pub const CHROME_WINDOWS_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const SAFARI_MAC_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";
pub const GOOGLEBOT_UA: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// Identities tried in order for every page
pub fn default_identities() -> Vec<BrowserIdentity> {
    vec![
        BrowserIdentity {
            name: "chrome-windows",
            user_agent: CHROME_WINDOWS_UA,
            accept: None,
        },
        BrowserIdentity {
            name: "safari-mac",
            user_agent: SAFARI_MAC_UA,
            accept: Some("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        },
        BrowserIdentity {
            name: "googlebot",
            user_agent: GOOGLEBOT_UA,
            accept: None,
        },
    ]
}

/// Fetches page bodies
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` once, presenting `identity`
    async fn get(
        &self,
        url: &str,
        identity: &BrowserIdentity,
        timeout: Duration,
    ) -> Result<String, FetchError>;
}

/// [`PageFetcher`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Builds the fetcher; redirects are followed (up to reqwest's default of 10)
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn get(
        &self,
        url: &str,
        identity: &BrowserIdentity,
        timeout: Duration,
    ) -> Result<String, FetchError> {
        let mut request = self
            .client
            .get(url)
            .timeout(timeout)
            .header(USER_AGENT, identity.user_agent);
        if let Some(accept) = identity.accept {
            request = request.header(ACCEPT, accept);
        }

        let response = request.send().await.map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify(url, e))
    }
}

fn classify(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// Fetches a page, trying each identity in turn until one succeeds
///
/// Returns `None` once every identity has failed; the failure is logged, never
/// propagated.
pub async fn fetch_with_fallback(
    fetcher: &dyn PageFetcher,
    url: &str,
    identities: &[BrowserIdentity],
    timeout: Duration,
) -> Option<String> {
    for identity in identities {
        match fetcher.get(url, identity, timeout).await {
            Ok(body) => return Some(body),
            Err(e) => {
                tracing::trace!(identity = identity.name, "Fetch attempt failed: {}", e);
            }
        }
    }

    tracing::debug!("Failed to fetch {} with all identities", url);
    None
}
