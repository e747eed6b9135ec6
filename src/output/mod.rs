//! Crawl output
//!
//! Reports are for human inspection: one line per fetched page and one line
//! per fetch error. Line order across tasks is not deterministic.

use crate::CrawlError;

/// Receives crawl results as tasks finish
pub trait Reporter: Send + Sync {
    /// A page was fetched successfully (including empty non-success pages)
    fn found(&self, url: &str, body: &str);

    /// Fetching `url` failed; its branch of the crawl ends here
    fn failed(&self, url: &str, error: &CrawlError);
}

/// Prints results to stdout
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    preview: Option<usize>,
}

impl ConsoleReporter {
    /// Prints whole bodies
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints at most `chars` characters of each body; 0 prints whole bodies
    pub fn with_preview(chars: usize) -> Self {
        Self {
            preview: (chars > 0).then_some(chars),
        }
    }

    /// Formats the line printed for a fetched page
    pub fn found_line(&self, url: &str, body: &str) -> String {
        match self.preview {
            Some(limit) if body.chars().count() > limit => {
                let preview: String = body.chars().take(limit).collect();
                format!("found: {} {:?}...", url, preview)
            }
            _ => format!("found: {} {:?}", url, body),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn found(&self, url: &str, body: &str) {
        println!("{}", self.found_line(url, body));
    }

    fn failed(&self, url: &str, error: &CrawlError) {
        tracing::debug!("Fetch failed for {}", url);
        println!("{}", error);
    }
}
