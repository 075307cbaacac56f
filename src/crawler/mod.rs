//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Fixed-size worker pools for fetching and link extraction
//! - Per-host admission control for fetches
//! - HTTP fetching and HTML link extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod pool;
mod scheduler;

pub use coordinator::{CrawlResult, WebCrawler};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use parser::{parse_html, Document, HtmlDocument, ParsedPage};
pub use pool::{Job, WorkerPool};
pub use scheduler::HostScheduler;

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl from configuration
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Build the HTTP fetcher
/// 2. Start the worker pools
/// 3. Crawl from `root` up to the configured depth
/// 4. Close the pools
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `root` - URL to start from
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl completed
/// * `Err(Error)` - Invalid configuration or root URL
///
/// # Example
///
/// ```no_run
/// use runnel::config::Config;
/// use runnel::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = crawl(&Config::default(), "https://example.com/").await?;
/// println!("{} pages fetched", result.visited.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, root: &str) -> Result<CrawlResult> {
    let fetcher = HttpFetcher::new(&config.user_agent, &config.http)?;
    let crawler = WebCrawler::from_config(fetcher, &config.crawler)?;
    let result = crawler.crawl(root, config.crawler.max_depth).await;
    crawler.close().await;
    result
}
