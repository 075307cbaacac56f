use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (e.g. `mailto:` or `data:` URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use runnel::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the host key for a resource identifier
///
/// Resources sharing a host key share one per-host concurrency budget. The
/// port is not part of the key.
///
/// # Returns
///
/// * `Ok(String)` - The lowercase host
/// * `Err(UrlError)` - The identifier is not a URL or has no host
///
/// # Examples
///
/// ```
/// use runnel::url::host_of;
///
/// assert_eq!(host_of("https://Blog.Example.com:8443/post").unwrap(), "blog.example.com");
/// assert!(host_of("not a url").is_err());
/// ```
pub fn host_of(url: &str) -> UrlResult<String> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    extract_domain(&parsed).ok_or_else(|| UrlError::MissingHost(url.to_string()))
}
