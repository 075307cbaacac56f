//! Crawler coordinator - main crawl orchestration logic
//!
//! [`WebCrawler`] owns the fetch and extraction pools. Each call to
//! [`WebCrawler::crawl`] builds a fresh [`CrawlContext`] (visited set, results,
//! errors, host scheduler, work tracker) and drives the recursive traversal:
//!
//! 1. Resolve the host of a URL and hand a fetch job to the host scheduler
//! 2. On a successful fetch, record the URL and, if depth allows, queue an
//!    extraction job
//! 3. For every extracted link not seen before, recurse with `depth - 1`
//! 4. Wait until every fetch and extraction unit has finished

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::Document;
use crate::crawler::pool::WorkerPool;
use crate::crawler::scheduler::HostScheduler;
use crate::state::{WorkGuard, WorkTracker};
use crate::url::host_of;
use crate::{CrawlError, Error};
use dashmap::{DashMap, DashSet};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of a crawl
#[derive(Debug, Default)]
pub struct CrawlResult {
    /// URLs fetched without error
    pub visited: HashSet<String>,

    /// URLs that failed, with the failure
    pub errors: HashMap<String, CrawlError>,
}

impl CrawlResult {
    /// Total number of URLs the crawl attempted
    pub fn attempted(&self) -> usize {
        self.visited.len() + self.errors.len()
    }

    /// True when no URL failed
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Visited URLs in lexical order
    pub fn sorted_visited(&self) -> Vec<&str> {
        let mut visited: Vec<&str> = self.visited.iter().map(String::as_str).collect();
        visited.sort_unstable();
        visited
    }
}

/// Concurrent, depth-bounded web crawler
///
/// # Example
///
/// ```no_run
/// use runnel::config::{HttpConfig, UserAgentConfig};
/// use runnel::{HttpFetcher, WebCrawler};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(&UserAgentConfig::default(), &HttpConfig::default())?;
/// let crawler = WebCrawler::new(fetcher, 8, 16, 2)?;
/// let result = crawler.crawl("https://example.com/", 2).await?;
/// println!("{} pages, {} errors", result.visited.len(), result.errors.len());
/// crawler.close().await;
/// # Ok(())
/// # }
/// ```
pub struct WebCrawler<F: Fetcher> {
    fetcher: Arc<F>,
    fetch_pool: Arc<WorkerPool>,
    extract_pool: Arc<WorkerPool>,
    per_host: usize,
}

impl<F: Fetcher> WebCrawler<F> {
    /// Creates a crawler and starts its worker pools
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetches documents
    /// * `downloaders` - Fetch pool size
    /// * `extractors` - Extraction pool size
    /// * `per_host` - Maximum concurrent fetches to one host
    ///
    /// # Returns
    ///
    /// * `Ok(WebCrawler)` - Ready to crawl
    /// * `Err(Error::InvalidArgument)` - A size or the cap is zero
    pub fn new(
        fetcher: F,
        downloaders: usize,
        extractors: usize,
        per_host: usize,
    ) -> Result<Self, Error> {
        if per_host == 0 {
            return Err(Error::InvalidArgument(
                "per-host limit must be at least 1".to_string(),
            ));
        }

        let fetch_pool = Arc::new(WorkerPool::new("fetch", downloaders)?);
        let extract_pool = Arc::new(WorkerPool::new("extract", extractors)?);

        Ok(Self {
            fetcher: Arc::new(fetcher),
            fetch_pool,
            extract_pool,
            per_host,
        })
    }

    /// Creates a crawler sized from configuration
    pub fn from_config(fetcher: F, config: &CrawlerConfig) -> Result<Self, Error> {
        Self::new(
            fetcher,
            config.downloaders,
            config.extractors,
            config.per_host,
        )
    }

    /// Crawls from `root`, following links up to `max_depth` levels
    ///
    /// Depth 1 (or 0) fetches only the root. Each URL is fetched at most once;
    /// failures are recorded per URL and never abort the crawl.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Fetched URLs and per-URL failures
    /// * `Err(Error::InvalidRoot)` - `root` has no host
    pub async fn crawl(&self, root: &str, max_depth: u32) -> Result<CrawlResult, Error> {
        host_of(root)?;

        tracing::info!("Starting crawl of {} (max depth {})", root, max_depth);
        let start_time = Instant::now();

        let context = Arc::new(CrawlContext {
            fetcher: Arc::clone(&self.fetcher),
            scheduler: Arc::new(HostScheduler::new(
                Arc::clone(&self.fetch_pool),
                self.per_host,
            )),
            extract_pool: Arc::clone(&self.extract_pool),
            tracker: WorkTracker::new(),
            queued: DashSet::new(),
            visited: DashSet::new(),
            errors: DashMap::new(),
        });

        context.queued.insert(root.to_string());
        let work = context.tracker.register();
        context.visit(root.to_string(), max_depth.max(1), work);

        context.tracker.wait_idle().await;

        let result = context.take_result();
        tracing::info!(
            "Crawl of {} completed: {} fetched, {} failed, {} hosts in {:?}",
            root,
            result.visited.len(),
            result.errors.len(),
            context.scheduler.host_count(),
            start_time.elapsed()
        );

        Ok(result)
    }

    /// Stops both pools from accepting new jobs
    ///
    /// Running jobs finish. A crawl still in progress sees the remaining
    /// fetches reported as [`CrawlError::Rejected`] and completes. Safe to call
    /// repeatedly.
    pub fn shutdown(&self) {
        self.fetch_pool.shutdown();
        self.extract_pool.shutdown();
    }

    /// Shuts down and waits for every worker to exit
    pub async fn close(&self) {
        self.shutdown();
        self.fetch_pool.join().await;
        self.extract_pool.join().await;
    }

    /// Returns whether [`WebCrawler::shutdown`] has been called
    pub fn is_shut_down(&self) -> bool {
        self.fetch_pool.is_shut_down() && self.extract_pool.is_shut_down()
    }

    /// Returns the fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

/// State of one crawl call
struct CrawlContext<F: Fetcher> {
    fetcher: Arc<F>,
    scheduler: Arc<HostScheduler>,
    extract_pool: Arc<WorkerPool>,
    tracker: WorkTracker,

    /// URLs already submitted for fetching (first submitter wins)
    queued: DashSet<String>,

    /// URLs fetched without error
    visited: DashSet<String>,

    /// Per-URL failures
    errors: DashMap<String, CrawlError>,
}

impl<F: Fetcher> CrawlContext<F> {
    /// Schedules a fetch of `url`; `work` is the unit registered for it
    fn visit(self: &Arc<Self>, url: String, depth: u32, work: WorkGuard) {
        let host = match host_of(&url) {
            Ok(host) => host,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", url, e);
                self.errors.insert(url, CrawlError::Host(e));
                return;
            }
        };

        let mut ticket = FetchTicket {
            context: Arc::clone(self),
            url,
            stage: FetchStage::Queued,
            _work: work,
        };

        let context = Arc::clone(self);
        self.scheduler.submit(&host, async move {
            ticket.stage = FetchStage::Fetching;
            let outcome = context.fetcher.fetch(&ticket.url).await;

            match outcome {
                Ok(document) => {
                    tracing::debug!("Fetched {}", ticket.url);
                    context.visited.insert(ticket.url.clone());
                    if depth > 1 {
                        context.extract(ticket.url.clone(), document, depth);
                    }
                }
                Err(e) => {
                    tracing::debug!("Failed to fetch {}: {}", ticket.url, e);
                    context
                        .errors
                        .insert(ticket.url.clone(), CrawlError::Fetch(e));
                }
            }

            // Releases the fetch unit after any extraction unit was registered
            ticket.stage = FetchStage::Settled;
            drop(ticket);
        });
    }

    /// Queues link extraction for a fetched document
    fn extract(self: &Arc<Self>, url: String, document: F::Document, depth: u32) {
        let work = self.tracker.register();
        let context = Arc::clone(self);

        let page = url.clone();
        let job = async move {
            let _work = work;
            let links = match document.extract_links() {
                Ok(links) => links,
                Err(e) => {
                    tracing::debug!("Ignoring extraction failure for {}: {}", page, e);
                    return;
                }
            };

            tracing::trace!("Extracted {} links from {}", links.len(), page);
            for link in links {
                if context.queued.insert(link.clone()) {
                    let child = context.tracker.register();
                    context.visit(link, depth - 1, child);
                }
            }
        };

        if let Err(e) = self.extract_pool.submit(job) {
            tracing::warn!("Extraction of {} rejected: {}", url, e);
        }
    }

    /// Moves the collected results out of the context
    ///
    /// Only valid once the work tracker is idle.
    fn take_result(&self) -> CrawlResult {
        let visited = self.visited.iter().map(|url| url.key().clone()).collect();

        let failed: Vec<String> = self.errors.iter().map(|entry| entry.key().clone()).collect();
        let errors = failed
            .into_iter()
            .filter_map(|url| self.errors.remove(&url))
            .collect();

        CrawlResult { visited, errors }
    }
}

/// A fetch on its way through the scheduler and the fetch pool
///
/// Holds the fetch's unit of work. Unless the fetch recorded its outcome, the
/// URL is recorded as failed before the unit is released: rejected if the job
/// never ran (the pool was shut down), aborted if it stopped mid-fetch (the
/// fetcher panicked).
struct FetchTicket<F: Fetcher> {
    context: Arc<CrawlContext<F>>,
    url: String,
    stage: FetchStage,
    _work: WorkGuard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchStage {
    Queued,
    Fetching,
    Settled,
}

impl<F: Fetcher> Drop for FetchTicket<F> {
    fn drop(&mut self) {
        let url = self.url.clone();
        let error = match self.stage {
            FetchStage::Settled => return,
            FetchStage::Queued => {
                tracing::warn!("Fetch of {} rejected: crawler is shut down", url);
                CrawlError::Rejected { url: url.clone() }
            }
            FetchStage::Fetching => {
                tracing::warn!("Fetch of {} aborted before completing", url);
                CrawlError::Aborted { url: url.clone() }
            }
        };
        self.context.errors.insert(url, error);
    }
}
