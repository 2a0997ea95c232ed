// Tests for crawl run orchestration

use std::time::Duration;

use gossamer_core::run::{RunOptions, execute_crawl, extract_url_path};
use gossamer_crawler::Strategy;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_html(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html.to_string()))
        .mount(server)
        .await;
}

// ============================================================================
// URL Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_url_path_root() {
    assert_eq!(extract_url_path("https://example.com/"), "/");
}

#[test]
fn test_extract_url_path_bare_host() {
    assert_eq!(extract_url_path("https://example.com"), "/");
}

#[test]
fn test_extract_url_path_nested() {
    assert_eq!(
        extract_url_path("https://example.com/docs/guide/intro"),
        "/docs/guide/intro"
    );
}

#[test]
fn test_extract_url_path_drops_query() {
    assert_eq!(
        extract_url_path("https://example.com/search?q=maps"),
        "/search"
    );
}

#[test]
fn test_extract_url_path_unparsable_passthrough() {
    assert_eq!(extract_url_path("not a url"), "not a url");
}

// ============================================================================
// Run Options Tests
// ============================================================================

#[test]
fn test_run_options_defaults() {
    let options = RunOptions::new("https://example.com");
    assert_eq!(options.seed, "https://example.com");
    assert_eq!(options.strategy, Strategy::BreadthFirst);
    assert_eq!(options.max_depth, Some(2));
    assert!(options.allowed_domains.is_empty());
    assert!(options.disallowed_extensions.is_empty());
    assert_eq!(options.timeout, Duration::from_secs(30));
    assert_eq!(options.politeness_delay, Duration::from_secs(1));
    assert!(options.show_progress);
}

// ============================================================================
// Crawl Execution Tests
// ============================================================================

#[tokio::test]
async fn test_execute_crawl_visits_linked_pages() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/",
        &format!("<html><body><a href=\"{}/a\">A</a></body></html>", server.uri()),
    )
    .await;
    serve_html(&server, "/a", "<html><body>leaf</body></html>").await;

    let mut options = RunOptions::new(server.uri());
    options.show_progress = false;
    options.politeness_delay = Duration::ZERO;

    let outcome = execute_crawl(options).await.unwrap();
    assert_eq!(outcome.stats.pages_visited, 2);
    assert!(outcome.graph.contains(&format!("{}/", server.uri())));
    assert!(outcome.graph.contains(&format!("{}/a", server.uri())));
    assert!(!outcome.stats.cancelled);
}

#[tokio::test]
async fn test_execute_crawl_with_progress_enabled() {
    // The spinner draws to stderr only on a tty; the callback wiring still
    // runs either way.
    let server = MockServer::start().await;
    serve_html(&server, "/", "<html><body>only page</body></html>").await;

    let mut options = RunOptions::new(server.uri());
    options.politeness_delay = Duration::ZERO;

    let outcome = execute_crawl(options).await.unwrap();
    assert_eq!(outcome.stats.pages_visited, 1);
}

#[tokio::test]
async fn test_execute_crawl_respects_strategy_and_depth() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/",
        &format!("<html><body><a href=\"{}/a\">A</a></body></html>", server.uri()),
    )
    .await;

    let mut options = RunOptions::new(server.uri());
    options.strategy = Strategy::DepthFirst;
    options.max_depth = Some(0);
    options.show_progress = false;
    options.politeness_delay = Duration::ZERO;

    let outcome = execute_crawl(options).await.unwrap();
    assert_eq!(outcome.stats.pages_visited, 1);
    assert!(!outcome.graph.contains(&format!("{}/a", server.uri())));
}

#[tokio::test]
async fn test_execute_crawl_invalid_seed_is_an_error() {
    let mut options = RunOptions::new("not a url");
    options.show_progress = false;

    let result = execute_crawl(options).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid URL"));
}
