use std::time::{Duration, Instant};

use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::debug;

use crate::error::Result;
use crate::graph::FetchMetrics;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("gossamer/", env!("CARGO_PKG_VERSION"));

/// Result of one fetch attempt. `content` is `Some` only for status codes in
/// [200, 400); everything else leaves a description in `metrics.error`.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub content: Option<String>,
    pub metrics: FetchMetrics,
}

/// HTTP layer of the crawler. Failures never surface as `Err`: every attempt
/// produces a [`FetchOutcome`] so the crawl can record it and move on.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .redirect(Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }

    /// Shared client, for one-off requests like the robots.txt probe.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches one URL, reading the full body before judging the status so
    /// that HTTP-level failures still carry timing and size measurements.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let mut metrics = FetchMetrics::default();
        let started = Instant::now();

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(error) => {
                debug!("Fetch of {} failed before a response: {}", url, error);
                metrics.error = Some(classify_error(&error));
                return FetchOutcome {
                    content: None,
                    metrics,
                };
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!("Fetch of {} failed reading the body: {}", url, error);
                metrics.status_code = Some(status.as_u16());
                metrics.error = Some(classify_error(&error));
                return FetchOutcome {
                    content: None,
                    metrics,
                };
            }
        };

        metrics.status_code = Some(status.as_u16());
        metrics.load_time = Some(round2(started.elapsed().as_secs_f64()));
        metrics.page_size_kb = Some(round2(bytes.len() as f64 / 1024.0));

        if status.as_u16() >= 400 {
            metrics.error = Some(format!("HTTP {status}"));
            return FetchOutcome {
                content: None,
                metrics,
            };
        }

        FetchOutcome {
            content: Some(String::from_utf8_lossy(&bytes).into_owned()),
            metrics,
        }
    }
}

/// Maps a transport error to the labels used in failure records. TLS is
/// checked before connect because handshake failures also count as connect
/// errors and would otherwise never get the SSL label.
fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Timeout".to_string()
    } else if is_tls_error(error) {
        "SSL Error".to_string()
    } else if error.is_connect() {
        "Connection Error".to_string()
    } else {
        error.to_string()
    }
}

fn is_tls_error(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        let text = inner.to_string().to_lowercase();
        if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
            return true;
        }
        source = inner.source();
    }
    false
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT).unwrap()
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.004), 0.0);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.0), 2.0);
    }

    #[tokio::test]
    async fn test_fetch_success_populates_metrics() {
        let server = MockServer::start().await;
        let body = "x".repeat(2048);
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let outcome = fetcher().fetch(&format!("{}/page", server.uri())).await;

        assert!(outcome.content.is_some());
        assert_eq!(outcome.metrics.status_code, Some(200));
        assert_eq!(outcome.metrics.page_size_kb, Some(2.0));
        assert!(outcome.metrics.load_time.is_some());
        assert!(outcome.metrics.error.is_none());
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        fetcher().fetch(&server.uri()).await;
    }

    #[tokio::test]
    async fn test_fetch_http_error_keeps_measurements() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boom"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let outcome = fetcher().fetch(&format!("{}/boom", server.uri())).await;

        assert!(outcome.content.is_none());
        assert_eq!(outcome.metrics.status_code, Some(500));
        assert!(outcome.metrics.load_time.is_some());
        assert!(outcome.metrics.page_size_kb.is_some());
        assert!(outcome.metrics.error.as_deref().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_404_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcome = fetcher().fetch(&format!("{}/missing", server.uri())).await;

        assert!(outcome.content.is_none());
        assert!(outcome.metrics.error.as_deref().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_timeout_classification() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Duration::from_millis(250), DEFAULT_USER_AGENT).unwrap();
        let outcome = fetcher.fetch(&server.uri()).await;

        assert!(outcome.content.is_none());
        assert_eq!(outcome.metrics.error.as_deref(), Some("Timeout"));
        assert_eq!(outcome.metrics.status_code, None);
        assert_eq!(outcome.metrics.load_time, None);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_classification() {
        // Nothing listens on port 1.
        let outcome = fetcher().fetch("http://127.0.0.1:1/").await;

        assert!(outcome.content.is_none());
        assert_eq!(outcome.metrics.error.as_deref(), Some("Connection Error"));
        assert_eq!(outcome.metrics.status_code, None);
    }
}
