use thiserror::Error;

/// Errors that abort a crawl before it produces results.
///
/// Fetch-level problems (timeouts, refused connections, HTTP error statuses)
/// are deliberately not represented here: the crawler records them as data on
/// the page that failed and keeps going.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
