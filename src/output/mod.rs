//! Output module for crawl results
//!
//! Summarises a [`crate::CrawlResult`] and prints it for the command line.

mod stats;

pub use stats::{print_report, print_statistics, CrawlStatistics};
