//! Document fetching
//!
//! This module defines the [`Fetcher`] capability the crawler consumes and
//! ships the default HTTP implementation:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Error classification (status codes, timeouts, unreachable hosts)

use crate::config::{HttpConfig, UserAgentConfig};
use crate::crawler::parser::{Document, HtmlDocument};
use crate::FetchError;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;

/// Turns a resource identifier into a document
///
/// Implementations may take as long as they need; the crawler runs each fetch
/// on a fetch-pool worker. Retries, if any, belong here and not in the crawler.
pub trait Fetcher: Send + Sync + 'static {
    /// Document type produced by a successful fetch
    type Document: Document;

    /// Fetches `url`
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Self::Document, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `http` - Timeouts for the client
///
/// # Example
///
/// ```no_run
/// use runnel::config::{HttpConfig, UserAgentConfig};
/// use runnel::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    http: &HttpConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(http.timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a reqwest client
///
/// Only `text/html` responses count as documents; everything else is reported
/// as a [`FetchError::ContentMismatch`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(user_agent: &UserAgentConfig, http: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(user_agent, http)?))
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    type Document = HtmlDocument;

    async fn fetch(&self, url: &str) -> Result<HtmlDocument, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(url, status));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, e))?;

        tracing::trace!("Fetched {} ({} bytes)", final_url, body.len());
        Ok(HtmlDocument::new(final_url, body))
    }
}

/// Maps a non-success status to a fetch error
fn status_error(url: &str, status: StatusCode) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
    }
}

/// Classifies a transport error
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Unreachable {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), &HttpConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_status_error() {
        let error = status_error("https://example.com/missing", StatusCode::NOT_FOUND);
        assert!(matches!(error, FetchError::Status { status: 404, .. }));
        assert_eq!(error.to_string(), "HTTP 404 for https://example.com/missing");
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let http = HttpConfig {
            timeout_secs: 2,
            connect_timeout_secs: 1,
        };
        let fetcher = HttpFetcher::new(&UserAgentConfig::default(), &http).unwrap();

        // Port 1 on localhost is reserved and refuses connections
        let result = fetcher.fetch("http://127.0.0.1:1/").await;
        assert!(matches!(
            result,
            Err(FetchError::Unreachable { .. }) | Err(FetchError::Timeout { .. })
        ));
    }

    // HTTP responses are covered with wiremock in the integration tests
}
