//! Fetch capability and its HTTP implementation
//!
//! This module handles all network retrieval for the crawler:
//! - The `Fetcher` trait the coordinator dispatches through
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests that hand successful bodies to the link extractor

use crate::config::Config;
use crate::crawler::parser::LinkExtractor;
use crate::crawler::tracker::Tracker;
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Result of a successful fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    /// Raw response body
    pub body: String,

    /// Links on the page claimed by this fetch, in document order
    pub links: Vec<String>,
}

impl FetchResult {
    /// An empty page: no body and no links
    ///
    /// Non-success responses are reported this way, so they look exactly like
    /// a page that has no content.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Retrieves one page and extracts its new links
///
/// Implementations claim the fetched URL on the crawl tracker and run the
/// link extractor over a successful body. A transport failure is an `Err`;
/// a non-success status is `Ok(FetchResult::empty())`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResult, CrawlError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and timeouts are read)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use depth_crawler::config::Config;
/// use depth_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.header_value())
        .gzip(true)
        .brotli(true);

    if let Some(secs) = config.http.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    if let Some(secs) = config.http.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Network-backed fetcher
///
/// Redirects follow the client's policy; only success versus non-success of
/// the final status is inspected.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    extractor: LinkExtractor,
}

impl HttpFetcher {
    pub fn new(client: Client, tracker: Arc<Tracker>) -> Self {
        Self {
            client,
            extractor: LinkExtractor::new(tracker),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, CrawlError> {
        // Links pointing back at a fetched page are suppressed from here on.
        self.extractor.tracker().claim(url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CrawlError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned HTTP {}, treating as empty", url, status);
            return Ok(FetchResult::empty());
        }

        let body = response.text().await.map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })?;

        let links = self.extractor.extract(&body);
        Ok(FetchResult { body, links })
    }
}
