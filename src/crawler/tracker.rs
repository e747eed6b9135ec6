//! Claimed-URL tracker shared by every task of one crawl

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Set of URL strings already claimed for processing
///
/// Keys are exact strings: `http://x/` and `http://x` are different entries.
/// Every access goes through one lock, so `claim` is an atomic
/// check-and-insert for all concurrent callers.
#[derive(Debug, Default)]
pub struct Tracker {
    claimed: Mutex<HashSet<String>>,
}

impl Tracker {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL
    ///
    /// Returns `true` the first time a given string is presented and `false`
    /// on every later presentation.
    ///
    /// # Example
    ///
    /// ```
    /// use depth_crawler::Tracker;
    ///
    /// let tracker = Tracker::new();
    /// assert!(tracker.claim("https://example.com/"));
    /// assert!(!tracker.claim("https://example.com/"));
    /// ```
    pub fn claim(&self, url: &str) -> bool {
        let mut claimed = self.lock();
        if claimed.contains(url) {
            return false;
        }
        claimed.insert(url.to_string())
    }

    /// Returns whether the URL has been claimed
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic elsewhere cannot leave the set half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
