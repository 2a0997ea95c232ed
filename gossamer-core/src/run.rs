use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gossamer_crawler::fetcher::DEFAULT_TIMEOUT;
use gossamer_crawler::robots::DEFAULT_POLITENESS_DELAY;
use gossamer_crawler::{CrawlOutcome, Crawler, Strategy};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Options for configuring a crawl run.
pub struct RunOptions {
    pub seed: String,
    pub strategy: Strategy,
    /// `None` crawls without a depth bound.
    pub max_depth: Option<usize>,
    pub allowed_domains: Vec<String>,
    pub disallowed_extensions: Vec<String>,
    pub timeout: Duration,
    pub politeness_delay: Duration,
    pub show_progress: bool,
}

impl RunOptions {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            strategy: Strategy::BreadthFirst,
            max_depth: Some(2),
            allowed_domains: Vec::new(),
            disallowed_extensions: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            politeness_delay: DEFAULT_POLITENESS_DELAY,
            show_progress: true,
        }
    }
}

/// Extract the path component from a URL, for compact progress lines.
pub fn extract_url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path();
            if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            }
        }
        Err(_) => url.to_string(),
    }
}

/// Runs a crawl with a progress spinner and Ctrl-C handling.
///
/// Ctrl-C cancels the crawl rather than killing the process, so whatever was
/// gathered so far still comes back as a (partial) outcome.
pub async fn execute_crawl(options: RunOptions) -> anyhow::Result<CrawlOutcome> {
    let RunOptions {
        seed,
        strategy,
        max_depth,
        allowed_domains,
        disallowed_extensions,
        timeout,
        politeness_delay,
        show_progress,
    } = options;

    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut crawler = Crawler::new(strategy)
        .with_timeout(timeout)
        .with_politeness_delay(politeness_delay)
        .with_allowed_domains(allowed_domains)
        .with_disallowed_extensions(disallowed_extensions);
    crawler = match max_depth {
        Some(depth) => crawler.with_max_depth(depth),
        None => crawler.with_unbounded_depth(),
    };

    let token = CancellationToken::new();
    crawler = crawler.with_cancellation_token(token.clone());

    let interrupt_token = token.clone();
    let interrupt_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt_token.cancel();
        }
    });

    let processed_count = Arc::new(AtomicUsize::new(0));
    if let Some(pb) = progress_bar.clone() {
        let count = processed_count.clone();
        crawler = crawler.with_progress_callback(Arc::new(move |_depth, url| {
            let visited = count.fetch_add(1, Ordering::Relaxed) + 1;
            pb.set_message(format!(
                "Crawling... {} pages \u{00b7} {}",
                visited,
                extract_url_path(&url)
            ));
            pb.tick();
        }));
    }

    let outcome = crawler.crawl(&seed).await;
    interrupt_task.abort();

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(pb) = &progress_bar {
                pb.finish_and_clear();
            }
            return Err(e.into());
        }
    };

    if let Some(pb) = progress_bar {
        if outcome.stats.cancelled {
            pb.finish_with_message(format!(
                "Crawl interrupted after {} pages",
                outcome.stats.pages_visited
            ));
        } else {
            pb.finish_with_message(format!(
                "Crawl complete! {} pages visited",
                outcome.stats.pages_visited
            ));
        }
    }

    Ok(outcome)
}
