//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The claimed-URL tracker shared by every task
//! - Link extraction from fetched markup
//! - HTTP and in-memory fetchers behind one `Fetcher` trait
//! - Task dispatch and global completion detection

mod coordinator;
mod counter;
mod fetcher;
mod memory;
mod parser;
mod tracker;

pub use coordinator::{Coordinator, CrawlTask};
pub use counter::CompletionCounter;
pub use fetcher::{build_http_client, FetchResult, Fetcher, HttpFetcher};
pub use memory::{MemoryFetcher, MemoryPage};
pub use parser::{classify_href, LinkDisposition, LinkExtractor};
pub use tracker::Tracker;

use crate::config::Config;
use crate::output::Reporter;
use crate::CrawlError;
use std::sync::Arc;

/// Runs a complete crawl operation over the network
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Create a fresh tracker for this crawl
/// 3. Dispatch the seed and wait for every task to finish
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `reporter` - Receives one call per fetched or failed page
///
/// # Returns
///
/// * `Ok(())` - Crawl ran to completion (individual pages may have failed)
/// * `Err(CrawlError)` - The client could not be built or a worker failed
pub async fn crawl(config: &Config, reporter: Arc<dyn Reporter>) -> Result<(), CrawlError> {
    let client = build_http_client(config)?;
    let tracker = Arc::new(Tracker::new());
    let fetcher = HttpFetcher::new(client, Arc::clone(&tracker));

    Coordinator::new(Arc::new(fetcher), reporter)
        .with_workers(config.crawler.workers)
        .run(&config.crawler.seed, config.crawler.max_depth)
        .await?;

    tracing::debug!("{} URLs claimed during crawl", tracker.len());
    Ok(())
}
