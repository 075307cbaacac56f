//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end with the HTTP fetcher.

use runnel::config::{Config, CrawlerConfig, HttpConfig, UserAgentConfig};
use runnel::crawler::crawl;
use runnel::{CrawlError, FetchError, HttpFetcher, WebCrawler};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_fetcher() -> HttpFetcher {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: Some("https://example.com/contact".to_string()),
        contact_email: Some("test@example.com".to_string()),
    };
    let http = HttpConfig {
        timeout_secs: 5,
        connect_timeout_secs: 2,
    };
    HttpFetcher::new(&user_agent, &http).expect("Failed to build fetcher")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_crawl_single_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="mailto:someone@example.com">Mail</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<html><body><a href="/">Home</a><a href="/page2">Page 2</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        r#"<html><body>Content 2</body></html>"#.to_string(),
    )
    .await;

    let crawler = WebCrawler::new(create_fetcher(), 4, 4, 2).expect("Failed to create crawler");
    let result = crawler
        .crawl(&format!("{}/", base_url), 3)
        .await
        .expect("Crawl failed");
    crawler.close().await;

    assert_eq!(
        result.sorted_visited(),
        vec![
            format!("{}/", base_url),
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
        ]
    );
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);

    // Every page fetched exactly once
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_http_errors_are_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="{0}/missing">Missing</a>
            <a href="{0}/image.png">Image</a>
            <a href="{0}/fine">Fine</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/image.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "image/png"),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fine", "<html><body>ok</body></html>".to_string()).await;

    let crawler = WebCrawler::new(create_fetcher(), 2, 2, 1).expect("Failed to create crawler");
    let result = crawler
        .crawl(&format!("{}/", base_url), 2)
        .await
        .expect("Crawl failed");
    crawler.close().await;

    assert_eq!(result.visited.len(), 2);
    assert!(matches!(
        result.errors.get(&format!("{}/missing", base_url)),
        Some(CrawlError::Fetch(FetchError::Status { status: 404, .. }))
    ));
    assert!(matches!(
        result.errors.get(&format!("{}/image.png", base_url)),
        Some(CrawlError::Fetch(FetchError::ContentMismatch { .. }))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Chain: / -> level1 -> level2 -> level3
    mount_page(
        &mock_server,
        "/",
        format!(r#"<html><body><a href="{}/level1">1</a></body></html>"#, base_url),
    )
    .await;
    mount_page(
        &mock_server,
        "/level1",
        format!(r#"<html><body><a href="{}/level2">2</a></body></html>"#, base_url),
    )
    .await;
    mount_page(
        &mock_server,
        "/level2",
        format!(r#"<html><body><a href="{}/level3">3</a></body></html>"#, base_url),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/level3"))
        .respond_with(html("<html><body>deep</body></html>".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Config {
        crawler: CrawlerConfig {
            max_depth: 3,
            downloaders: 2,
            extractors: 2,
            per_host: 1,
        },
        ..Config::default()
    };

    let result = crawl(&config, &format!("{}/", base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(result.visited.len(), 3);
    assert!(!result.visited.contains(&format!("{}/level3", base_url)));
    // Wiremock verifies that /level3 was never requested when the server drops
}

#[tokio::test]
async fn test_user_agent_header_sent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(html("<html><body>hi</body></html>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = WebCrawler::new(create_fetcher(), 1, 1, 1).expect("Failed to create crawler");
    let result = crawler
        .crawl(&format!("{}/", base_url), 1)
        .await
        .expect("Crawl failed");
    crawler.close().await;

    assert_eq!(result.visited.len(), 1);
}
