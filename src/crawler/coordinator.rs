//! Crawler coordinator - main crawl orchestration logic
//!
//! Crawl tasks are dispatched into a task queue drained by a fixed set of
//! worker tasks. A task that fetches a page dispatches one child per new link
//! and finishes without waiting for them; the crawl ends when the shared
//! completion counter returns to zero.

use crate::config::DEFAULT_WORKERS;
use crate::crawler::counter::{CompletionCounter, TaskGuard};
use crate::crawler::fetcher::Fetcher;
use crate::output::Reporter;
use crate::CrawlError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};

/// One attempt to fetch and process a URL at a remaining depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// The URL to fetch
    pub url: String,

    /// Remaining link-depth; a task at depth 0 is pruned without fetching
    pub depth: u32,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

#[derive(Debug, Default)]
struct CrawlMetrics {
    dispatched: AtomicUsize,
    fetched: AtomicUsize,
    failed: AtomicUsize,
    pruned: AtomicUsize,
}

impl CrawlMetrics {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn log_summary(&self, elapsed: Duration) {
        tracing::info!(
            "Crawl complete: {} tasks dispatched, {} pages fetched, {} failed, {} pruned at depth limit in {:?}",
            self.dispatched.load(Ordering::Relaxed),
            self.fetched.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
            self.pruned.load(Ordering::Relaxed),
            elapsed
        );
    }
}

/// State shared by all workers of one crawl run
struct CrawlSession {
    fetcher: Arc<dyn Fetcher>,
    reporter: Arc<dyn Reporter>,
    queue: mpsc::UnboundedSender<CrawlTask>,
    pending: Mutex<mpsc::UnboundedReceiver<CrawlTask>>,
    counter: CompletionCounter,
    metrics: CrawlMetrics,
}

impl CrawlSession {
    /// Counts the task as in flight and queues it; never blocks the caller
    fn dispatch(&self, task: CrawlTask) {
        self.counter.add();
        CrawlMetrics::bump(&self.metrics.dispatched);
        tracing::debug!("Dispatching {} at depth {}", task.url, task.depth);

        if let Err(rejected) = self.queue.send(task) {
            tracing::error!("Task queue closed, dropping {}", rejected.0.url);
            self.counter.done();
        }
    }

    /// Runs one task to completion: prune, or fetch, report and dispatch children
    async fn process(&self, task: CrawlTask) {
        let _done = TaskGuard::new(&self.counter);

        if task.depth == 0 {
            tracing::trace!("Pruning {} at depth limit", task.url);
            CrawlMetrics::bump(&self.metrics.pruned);
            return;
        }

        match self.fetcher.fetch(&task.url).await {
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", task.url, e);
                CrawlMetrics::bump(&self.metrics.failed);
                self.reporter.failed(&task.url, &e);
            }
            Ok(result) => {
                CrawlMetrics::bump(&self.metrics.fetched);
                self.reporter.found(&task.url, &result.body);

                let child_depth = task.depth - 1;
                for link in result.links {
                    self.dispatch(CrawlTask::new(link, child_depth));
                }
            }
        }
    }

    /// Takes the next queued task, or `None` once nothing is in flight
    async fn next_task(&self) -> Option<CrawlTask> {
        let mut pending = self.pending.lock().await;
        tokio::select! {
            task = pending.recv() => task,
            _ = self.counter.wait() => None,
        }
    }
}

async fn worker_loop(worker_id: usize, session: Arc<CrawlSession>) {
    while let Some(task) = session.next_task().await {
        session.process(task).await;
    }
    tracing::trace!("Worker {} exiting", worker_id);
}

/// Main crawler coordinator structure
///
/// The fetcher decides how pages are retrieved and owns the crawl's tracker;
/// the reporter receives one call per fetched or failed page.
pub struct Coordinator {
    fetcher: Arc<dyn Fetcher>,
    reporter: Arc<dyn Reporter>,
    workers: usize,
}

impl Coordinator {
    /// Creates a coordinator with the default worker count
    pub fn new(fetcher: Arc<dyn Fetcher>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            fetcher,
            reporter,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Sets the number of worker tasks (at least one)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Crawls from `seed` and returns once every dispatched task has finished
    ///
    /// The seed is fetched at `max_depth`; a seed depth of 0 fetches nothing.
    /// Depths are unsigned, so 0 is the only pruned depth and a negative depth
    /// cannot be expressed.
    /// Fetch failures only end their own branch and are sent to the reporter;
    /// the returned error covers worker failures alone.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use depth_crawler::crawler::{build_http_client, HttpFetcher};
    /// use depth_crawler::config::Config;
    /// use depth_crawler::{ConsoleReporter, Coordinator, Tracker};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = build_http_client(&Config::default())?;
    /// let fetcher = HttpFetcher::new(client, Arc::new(Tracker::new()));
    /// let coordinator = Coordinator::new(Arc::new(fetcher), Arc::new(ConsoleReporter::new()));
    /// coordinator.run("https://example.com/", 2).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, seed: &str, max_depth: u32) -> Result<(), CrawlError> {
        let start_time = Instant::now();
        tracing::info!(
            "Starting crawl of {} (max depth {}, {} workers)",
            seed,
            max_depth,
            self.workers
        );

        let (queue, pending) = mpsc::unbounded_channel();
        let session = Arc::new(CrawlSession {
            fetcher: Arc::clone(&self.fetcher),
            reporter: Arc::clone(&self.reporter),
            queue,
            pending: Mutex::new(pending),
            counter: CompletionCounter::new(),
            metrics: CrawlMetrics::default(),
        });

        // The root must be counted before any worker can observe an idle counter.
        session.dispatch(CrawlTask::new(seed, max_depth));

        let handles: Vec<_> = (0..self.workers)
            .map(|worker_id| tokio::spawn(worker_loop(worker_id, Arc::clone(&session))))
            .collect();

        session.counter.wait().await;

        for handle in handles {
            handle
                .await
                .map_err(|e| CrawlError::Worker(e.to_string()))?;
        }

        session.metrics.log_summary(start_time.elapsed());
        Ok(())
    }
}
