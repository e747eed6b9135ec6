//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the HTTP
//! fetcher through the coordinator end-to-end.

use depth_crawler::config::Config;
use depth_crawler::crawler::{build_http_client, HttpFetcher};
use depth_crawler::{Coordinator, CrawlError, Fetcher, FetchResult, Reporter, Tracker};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingReporter {
    found: Mutex<Vec<String>>,
    failed: Mutex<Vec<String>>,
}

impl RecordingReporter {
    fn found(&self) -> Vec<String> {
        let mut urls = self.found.lock().unwrap().clone();
        urls.sort();
        urls
    }

    fn failed(&self) -> Vec<String> {
        self.failed.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn found(&self, url: &str, _body: &str) {
        self.found.lock().unwrap().push(url.to_string());
    }

    fn failed(&self, url: &str, _error: &CrawlError) {
        self.failed.lock().unwrap().push(url.to_string());
    }
}

fn html_page(links: &[String]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">link</a>"#, link))
        .collect();
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", anchors))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

fn http_fetcher(tracker: &Arc<Tracker>) -> HttpFetcher {
    let client = build_http_client(&Config::default()).expect("Failed to build client");
    HttpFetcher::new(client, Arc::clone(tracker))
}

async fn run(fetcher: HttpFetcher, reporter: &Arc<RecordingReporter>, seed: &str, depth: u32) {
    let coordinator = Coordinator::new(Arc::new(fetcher), Arc::clone(reporter) as Arc<dyn Reporter>)
        .with_workers(4);
    tokio::time::timeout(Duration::from_secs(30), coordinator.run(seed, depth))
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed");
}

async fn received_paths(server: &MockServer) -> Vec<String> {
    let mut paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn test_depth_limited_crawl_with_back_link() {
    let server = MockServer::start().await;
    let base = server.uri();
    let a = format!("{}/a", base);
    let b = format!("{}/b", base);
    let c = format!("{}/c", base);
    let d = format!("{}/d", base);

    mount_page(&server, "/a", html_page(&[b.clone(), c.clone()])).await;
    mount_page(&server, "/b", html_page(&[a.clone(), d.clone()])).await;
    mount_page(&server, "/c", html_page(&[])).await;
    mount_page(&server, "/d", html_page(&[])).await;

    let tracker = Arc::new(Tracker::new());
    let reporter = Arc::new(RecordingReporter::default());
    run(http_fetcher(&tracker), &reporter, &a, 2).await;

    assert_eq!(reporter.found(), vec![a.clone(), b, c]);
    assert!(reporter.failed().is_empty());
    assert!(tracker.contains(&d));

    // /d was claimed but sits at depth 0, so it is never requested.
    assert_eq!(received_paths(&server).await, vec!["/a", "/b", "/c"]);
}

#[tokio::test]
async fn test_not_found_page_is_empty_success() {
    let server = MockServer::start().await;
    let seed = format!("{}/missing", server.uri());

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(format!(r#"<a href="{}/hidden">x</a>"#, server.uri())),
        )
        .mount(&server)
        .await;

    let tracker = Arc::new(Tracker::new());
    let fetcher = http_fetcher(&tracker);

    let result = fetcher.fetch(&seed).await.expect("404 must not be an error");
    assert_eq!(result, FetchResult::empty());

    let reporter = Arc::new(RecordingReporter::default());
    run(http_fetcher(&Arc::new(Tracker::new())), &reporter, &seed, 3).await;
    assert_eq!(reporter.found(), vec![seed]);
    assert!(reporter.failed().is_empty());
}

#[tokio::test]
async fn test_relative_links_are_not_followed() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        ResponseTemplate::new(200).set_body_string(
            r#"<html><body><a href="/relative">Relative</a><a href="page2">Also relative</a></body></html>"#,
        ),
    )
    .await;

    let reporter = Arc::new(RecordingReporter::default());
    run(http_fetcher(&Arc::new(Tracker::new())), &reporter, &seed, 3).await;

    assert_eq!(reporter.found(), vec![seed]);
    assert_eq!(received_paths(&server).await, vec!["/"]);
}

#[tokio::test]
async fn test_unreachable_link_fails_only_its_branch() {
    let server = MockServer::start().await;
    let base = server.uri();
    let seed = format!("{}/", base);
    let ok = format!("{}/ok", base);
    // Nothing listens on port 1.
    let dead = "http://127.0.0.1:1/dead".to_string();

    mount_page(&server, "/", html_page(&[dead.clone(), ok.clone()])).await;
    mount_page(&server, "/ok", html_page(&[])).await;

    let reporter = Arc::new(RecordingReporter::default());
    run(http_fetcher(&Arc::new(Tracker::new())), &reporter, &seed, 2).await;

    assert_eq!(reporter.failed(), vec![dead]);
    assert_eq!(reporter.found(), vec![seed, ok]);
}

#[tokio::test]
async fn test_shared_link_requested_once() {
    let server = MockServer::start().await;
    let base = server.uri();
    let seed = format!("{}/", base);
    let left = format!("{}/left", base);
    let right = format!("{}/right", base);
    let shared = format!("{}/shared", base);

    mount_page(&server, "/", html_page(&[left.clone(), right.clone()])).await;
    mount_page(&server, "/left", html_page(&[shared.clone()])).await;
    mount_page(&server, "/right", html_page(&[shared.clone()])).await;
    mount_page(&server, "/shared", html_page(&[])).await;

    let reporter = Arc::new(RecordingReporter::default());
    run(http_fetcher(&Arc::new(Tracker::new())), &reporter, &seed, 3).await;

    let paths = received_paths(&server).await;
    assert_eq!(paths.iter().filter(|p| p.as_str() == "/shared").count(), 1);
    assert_eq!(paths.len(), 4);
}
