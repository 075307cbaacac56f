//! Runnel: a concurrent, depth-bounded web crawler
//!
//! This crate fetches a root page, follows outbound links up to a given depth
//! and reports which pages were fetched and which failed. Fetches run on a
//! bounded worker pool, link extraction on a second one, and a per-host
//! scheduler keeps the number of concurrent requests to any single host under
//! a configured cap.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Runnel operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid root URL: {0}")]
    InvalidRoot(#[from] UrlError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Errors reported by a [`crawler::Fetcher`]
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Host unreachable for {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Failed to fetch {url}: {message}")]
    Other { url: String, message: String },
}

/// Errors reported by [`crawler::Document::extract_links`]
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid base URL {url}: {message}")]
    InvalidBase { url: String, message: String },
}

/// Per-URL failure recorded in a crawl's error map
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Host(#[from] UrlError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Fetch of {url} rejected: crawler is shut down")]
    Rejected { url: String },

    #[error("Fetch of {url} aborted before completing")]
    Aborted { url: String },
}

impl CrawlError {
    /// Short, stable name of the failure kind (used for summaries)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Host(_) => "host",
            Self::Fetch(FetchError::Http { .. }) => "http",
            Self::Fetch(FetchError::Timeout { .. }) => "timeout",
            Self::Fetch(FetchError::Unreachable { .. }) => "unreachable",
            Self::Fetch(FetchError::Status { .. }) => "status",
            Self::Fetch(FetchError::ContentMismatch { .. }) => "content-mismatch",
            Self::Fetch(FetchError::Other { .. }) => "other",
            Self::Rejected { .. } => "rejected",
            Self::Aborted { .. } => "aborted",
        }
    }
}

/// Worker pool errors
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("{pool} pool is shut down")]
    ShutDown { pool: &'static str },
}

/// Result type alias for Runnel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::crawler::{CrawlResult, Document, Fetcher, HtmlDocument, HttpFetcher, WebCrawler};
pub use crate::url::host_of;
