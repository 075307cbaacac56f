use serde::Deserialize;

/// Main configuration structure for Runnel
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub http: HttpConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the root URL (1 fetches only the root)
    pub max_depth: u32,

    /// Number of fetch workers
    pub downloaders: usize,

    /// Number of link extraction workers
    pub extractors: usize,

    /// Maximum number of concurrent fetches to a single host
    pub per_host: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            downloaders: 1,
            extractors: 1,
            per_host: 1,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    pub contact_email: Option<String>,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `Name/Version (+ContactURL; ContactEmail)`, with the parenthesised
    /// part reduced to whatever contact details are configured.
    pub fn header_value(&self) -> String {
        let base = format!("{}/{}", self.crawler_name, self.crawler_version);
        match (&self.contact_url, &self.contact_email) {
            (Some(url), Some(email)) => format!("{} (+{}; {})", base, url, email),
            (Some(url), None) => format!("{} (+{})", base, url),
            (None, Some(email)) => format!("{} ({})", base, email),
            (None, None) => base,
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Total request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_agent(url: Option<&str>, email: Option<&str>) -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: url.map(str::to_string),
            contact_email: email.map(str::to_string),
        }
    }

    #[test]
    fn test_header_value_full() {
        let ua = user_agent(Some("https://example.com/about"), Some("admin@example.com"));
        assert_eq!(
            ua.header_value(),
            "TestCrawler/1.0 (+https://example.com/about; admin@example.com)"
        );
    }

    #[test]
    fn test_header_value_partial() {
        assert_eq!(
            user_agent(Some("https://example.com"), None).header_value(),
            "TestCrawler/1.0 (+https://example.com)"
        );
        assert_eq!(
            user_agent(None, Some("a@example.com")).header_value(),
            "TestCrawler/1.0 (a@example.com)"
        );
        assert_eq!(user_agent(None, None).header_value(), "TestCrawler/1.0");
    }

    #[test]
    fn test_crawler_defaults() {
        let config = CrawlerConfig::default();
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.downloaders, 1);
        assert_eq!(config.extractors, 1);
        assert_eq!(config.per_host, 1);
    }
}
