//! Statistics generation from crawl results

use crate::crawler::CrawlResult;
use crate::url::host_of;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Number of pages fetched successfully
    pub visited: usize,

    /// Number of URLs that failed
    pub failed: usize,

    /// Number of distinct hosts among fetched pages
    pub unique_hosts: usize,

    /// Fetched pages per host
    pub pages_by_host: BTreeMap<String, usize>,

    /// Failures per kind (see [`crate::CrawlError::kind`])
    pub errors_by_kind: BTreeMap<&'static str, usize>,
}

impl CrawlStatistics {
    /// Computes statistics for a crawl result
    pub fn from_result(result: &CrawlResult) -> Self {
        let mut pages_by_host = BTreeMap::new();
        for url in &result.visited {
            if let Ok(host) = host_of(url) {
                *pages_by_host.entry(host).or_insert(0) += 1;
            }
        }

        let mut errors_by_kind = BTreeMap::new();
        for error in result.errors.values() {
            *errors_by_kind.entry(error.kind()).or_insert(0) += 1;
        }

        Self {
            visited: result.visited.len(),
            failed: result.errors.len(),
            unique_hosts: pages_by_host.len(),
            pages_by_host,
            errors_by_kind,
        }
    }

    /// Share of attempted URLs that were fetched, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.visited + self.failed;
        if attempted == 0 {
            0.0
        } else {
            (self.visited as f64 / attempted as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages fetched: {}", stats.visited);
    println!("  Failures: {}", stats.failed);
    println!("  Unique hosts: {}", stats.unique_hosts);
    println!("  Success rate: {:.1}%", stats.success_rate());
    println!();

    if !stats.pages_by_host.is_empty() {
        println!("Pages by Host:");
        // Busiest hosts first
        let mut hosts: Vec<_> = stats.pages_by_host.iter().collect();
        hosts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (host, count) in hosts {
            println!("  {}: {}", host, count);
        }
        println!();
    }

    if !stats.errors_by_kind.is_empty() {
        println!("Failures by Kind:");
        for (kind, count) in &stats.errors_by_kind {
            println!("  {}: {}", kind, count);
        }
        println!();
    }
}

/// Prints the fetched URLs and failures of a crawl
pub fn print_report(result: &CrawlResult) {
    println!("Fetched ({}):", result.visited.len());
    for url in result.sorted_visited() {
        println!("  {}", url);
    }

    if !result.errors.is_empty() {
        println!("\nFailed ({}):", result.errors.len());
        let mut errors: Vec<_> = result.errors.iter().collect();
        errors.sort_by(|a, b| a.0.cmp(b.0));
        for (url, error) in errors {
            println!("  {}: {}", url, error);
        }
    }
    println!();
}
