//! HTML parser for extracting links and metadata
//!
//! This module defines the [`Document`] capability and its HTML
//! implementation, which extracts:
//! - Links to follow (from <a> tags and canonical links)
//! - Page title

use crate::ExtractError;
use scraper::{Html, Selector};
use url::Url;

/// A fetched document that can list its outbound links
pub trait Document: Send + 'static {
    /// Extracts the absolute URLs this document links to
    fn extract_links(&self) -> Result<Vec<String>, ExtractError>;
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All links found on the page (absolute URLs)
    pub links: Vec<String>,
}

/// An HTML page fetched from `url`
///
/// Parsing is deferred to [`Document::extract_links`] so the document can move
/// between threads before it is parsed.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    url: String,
    body: String,
}

impl HtmlDocument {
    /// Creates a document from its (final) URL and body
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// URL the document was fetched from, used to resolve relative links
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw HTML
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the page into its title and links
    pub fn parse(&self) -> Result<ParsedPage, ExtractError> {
        let base_url = Url::parse(&self.url).map_err(|e| ExtractError::InvalidBase {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        Ok(parse_html(&self.body, &base_url))
    }
}

impl Document for HtmlDocument {
    fn extract_links(&self) -> Result<Vec<String>, ExtractError> {
        self.parse().map(|page| page.links)
    }
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Non-HTTP(S) URLs after resolution
///
/// Fragments are stripped from resolved links so that anchors on one page do
/// not count as separate resources. `rel="nofollow"` links are followed.
///
/// # Example
///
/// ```
/// use runnel::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
