//! Deterministic in-memory fetcher
//!
//! Serves pages from a fixed table keyed by exact URL string. It runs the same
//! link extraction as the HTTP fetcher and counts how often each URL was
//! fetched, which makes crawl behaviour observable without a network.

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::LinkExtractor;
use crate::crawler::tracker::Tracker;
use crate::CrawlError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A canned response
#[derive(Debug, Clone)]
pub enum MemoryPage {
    /// A response with the given status and body
    Response { status: u16, body: String },
    /// A transport failure with the given message
    Unreachable(String),
}

impl MemoryPage {
    /// A 200 response
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Response {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Response {
            status,
            body: body.into(),
        }
    }
}

/// Fetcher backed by an in-memory page table
#[derive(Debug)]
pub struct MemoryFetcher {
    pages: HashMap<String, MemoryPage>,
    extractor: LinkExtractor,
    fetches: Mutex<HashMap<String, usize>>,
}

impl MemoryFetcher {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self {
            pages: HashMap::new(),
            extractor: LinkExtractor::new(tracker),
            fetches: Mutex::new(HashMap::new()),
        }
    }

    /// Adds or replaces the page served for `url`
    pub fn with_page(mut self, url: impl Into<String>, page: MemoryPage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Number of times `url` was fetched
    pub fn fetch_count(&self, url: &str) -> usize {
        self.lock_fetches().get(url).copied().unwrap_or(0)
    }

    /// Total number of fetches across all URLs
    pub fn total_fetches(&self) -> usize {
        self.lock_fetches().values().sum()
    }

    fn lock_fetches(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        self.fetches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, CrawlError> {
        *self.lock_fetches().entry(url.to_string()).or_insert(0) += 1;
        self.extractor.tracker().claim(url);

        match self.pages.get(url) {
            None => Err(CrawlError::Unreachable {
                url: url.to_string(),
                message: "not found".to_string(),
            }),
            Some(MemoryPage::Unreachable(message)) => Err(CrawlError::Unreachable {
                url: url.to_string(),
                message: message.clone(),
            }),
            Some(MemoryPage::Response { status, .. }) if !(200..300).contains(status) => {
                Ok(FetchResult::empty())
            }
            Some(MemoryPage::Response { body, .. }) => Ok(FetchResult {
                body: body.clone(),
                links: self.extractor.extract(body),
            }),
        }
    }
}
