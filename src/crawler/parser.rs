//! HTML link extraction
//!
//! This module walks the `<a href>` elements of a page in document order and
//! keeps only absolute, hosted URLs that no other part of the crawl has
//! claimed yet. Relative links are never resolved against the page URL, so
//! navigation that relies on relative paths is invisible to the crawl.

use crate::crawler::tracker::Tracker;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, ParseOpts};
use scraper::{Html, Selector};
use std::sync::Arc;
use url::{ParseError, Url};

/// What happened to a single `href` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDisposition {
    /// First sighting anywhere in the crawl; the link is followed
    New,
    /// Hosted URL claimed earlier by this or another page
    AlreadyClaimed,
    /// No scheme and no `//host`, so it only makes sense relative to a base
    Relative,
    /// Parsed, but without a host (`mailto:`, `javascript:`, ...)
    NoHost,
    /// Could not be parsed at all
    Malformed(ParseError),
}

impl LinkDisposition {
    /// Returns true if the link should become a crawl task
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }
}

/// Decides what to do with one `href` value
///
/// Only hosted URLs reach the tracker; the claim is made on the exact
/// attribute string. A protocol-relative `//host/path` counts as hosted even
/// though it has no scheme.
///
/// # Example
///
/// ```
/// use depth_crawler::crawler::{classify_href, LinkDisposition};
/// use depth_crawler::Tracker;
///
/// let tracker = Tracker::new();
/// assert_eq!(classify_href("https://example.com/a", &tracker), LinkDisposition::New);
/// assert_eq!(classify_href("https://example.com/a", &tracker), LinkDisposition::AlreadyClaimed);
/// assert_eq!(classify_href("/a", &tracker), LinkDisposition::Relative);
/// ```
pub fn classify_href(href: &str, tracker: &Tracker) -> LinkDisposition {
    match Url::parse(href) {
        Ok(url) if url.host_str().is_none() => return LinkDisposition::NoHost,
        Ok(_) => {}
        Err(ParseError::RelativeUrlWithoutBase) => match protocol_relative_host(href) {
            None => return LinkDisposition::Relative,
            Some(_) => {
                // Borrow a scheme only to check the authority and path are well formed.
                if let Err(e) = Url::parse(&format!("http:{}", href)) {
                    return LinkDisposition::Malformed(e);
                }
            }
        },
        Err(e) => return LinkDisposition::Malformed(e),
    }

    if tracker.claim(href) {
        LinkDisposition::New
    } else {
        LinkDisposition::AlreadyClaimed
    }
}

/// Host (with any port) of a `//host/path` reference
fn protocol_relative_host(href: &str) -> Option<&str> {
    let rest = href.strip_prefix("//")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();
    (!host.is_empty()).then_some(host)
}

/// Parses markup with scripting disabled so `<noscript>` content is parsed as
/// elements instead of raw text
fn parse_markup(html: &str) -> Html {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(Html::new_document(), opts).one(html)
}

/// Extracts new absolute links from page markup
///
/// Holds the crawl's shared tracker, so "new" means never seen anywhere in the
/// crawl, not merely within one document.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    tracker: Arc<Tracker>,
}

impl LinkExtractor {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }

    /// The tracker links are claimed on
    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    /// Returns the links in `html` that were claimed by this call, in document order
    pub fn extract(&self, html: &str) -> Vec<String> {
        let document = parse_markup(html);
        let mut links = Vec::new();

        let Ok(a_selector) = Selector::parse("a[href]") else {
            return links;
        };

        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let disposition = classify_href(href, &self.tracker);
            if disposition.is_new() {
                links.push(href.to_string());
                continue;
            }

            match disposition {
                LinkDisposition::Malformed(e) => {
                    tracing::debug!("Skipping malformed link {:?}: {}", href, e);
                }
                LinkDisposition::AlreadyClaimed => {
                    tracing::trace!("Skipping already claimed link {}", href);
                }
                LinkDisposition::Relative | LinkDisposition::NoHost => {
                    tracing::trace!("Skipping link without host {:?}", href);
                }
                LinkDisposition::New => {}
            }
        }

        links
    }
}
