use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{CrawlError, Result};
use crate::fetcher::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, Fetcher, round2};
use crate::frontier::{Frontier, Strategy};
use crate::graph::{CrawlGraph, CrawlStats, PageRecord, SiteGraph, categorize};
use crate::page;
use crate::robots::{DEFAULT_POLITENESS_DELAY, RobotsGate};

/// Called with `(depth, url)` right before each fetch attempt.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Finalized output of a crawl run: the categorized graph plus run counters.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub graph: SiteGraph,
    pub stats: CrawlStats,
}

/// A configured crawl. Build one with the `with_*` methods, then call
/// [`Crawler::crawl`] with a seed URL.
///
/// Pages are visited one at a time, in the exact order dictated by the
/// strategy, with the politeness delay between fetches acting as a global
/// rate limit.
pub struct Crawler {
    strategy: Strategy,
    max_depth: Option<usize>,
    allowed_domains: Vec<String>,
    disallowed_extensions: Vec<String>,
    timeout: Duration,
    politeness_delay: Duration,
    user_agent: String,
    cancel: CancellationToken,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            max_depth: Some(2),
            allowed_domains: Vec::new(),
            disallowed_extensions: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            politeness_delay: DEFAULT_POLITENESS_DELAY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cancel: CancellationToken::new(),
            progress_callback: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Crawl until the frontier drains, no matter how deep.
    pub fn with_unbounded_depth(mut self) -> Self {
        self.max_depth = None;
        self
    }

    /// Restrict the crawl to links whose host appears in `domains`.
    /// An empty list (the default) means no restriction.
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = domains;
        self
    }

    /// Drop links whose URL path ends in one of these extensions, e.g. `.pdf`.
    pub fn with_disallowed_extensions(mut self, extensions: Vec<String>) -> Self {
        self.disallowed_extensions = extensions;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Minimum wait before each fetch. Robots `Crawl-delay` can lengthen it
    /// but never shorten it.
    pub fn with_politeness_delay(mut self, delay: Duration) -> Self {
        self.politeness_delay = delay;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Token checked at each loop iteration and while waiting on a fetch;
    /// cancelling it ends the crawl with whatever was gathered so far.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Runs the crawl to completion and returns the categorized site graph.
    ///
    /// Only configuration problems (unparseable seed, client build failure)
    /// return `Err`. Fetch failures are recorded in the graph; robots-blocked
    /// and non-web URLs are counted in the stats and leave no record.
    pub async fn crawl(&self, seed: &str) -> Result<CrawlOutcome> {
        let seed_url =
            Url::parse(seed).map_err(|e| CrawlError::InvalidUrl(format!("{seed}: {e}")))?;

        info!("Starting {} crawl of {}", self.strategy, seed_url);

        let mut stats = CrawlStats::new();
        let started = Instant::now();

        let fetcher = Fetcher::new(self.timeout, &self.user_agent)?;
        let gate = RobotsGate::discover(
            fetcher.client(),
            &seed_url,
            &self.user_agent,
            self.politeness_delay,
        )
        .await;

        let mut frontier = Frontier::new(self.strategy);
        // The parsed form is the canonical key, so the seed dedups against
        // its own discovered links.
        frontier.push(seed_url.to_string(), 0);

        let mut graph = CrawlGraph::new();

        while let Some(entry) = frontier.pop() {
            if self.cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }

            let base_url = match Url::parse(&entry.url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => url,
                _ => {
                    debug!("Skipping non-web URL {}", entry.url);
                    stats.skipped_non_web += 1;
                    continue;
                }
            };

            if !gate.allowed(&entry.url) {
                info!("Blocked by robots.txt: {}", entry.url);
                stats.blocked_by_robots += 1;
                continue;
            }

            if let Some(callback) = &self.progress_callback {
                callback(entry.depth, entry.url.clone());
            }

            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => {
                    stats.cancelled = true;
                    break;
                }
                outcome = async {
                    gate.pause().await;
                    fetcher.fetch(&entry.url).await
                } => outcome,
            };

            match outcome.content {
                Some(html) => {
                    let content = page::extract_content(&html, &base_url);
                    let links = page::filter_links(
                        &content.links,
                        &self.allowed_domains,
                        &self.disallowed_extensions,
                    );
                    debug!(
                        "Visited {} at depth {} ({} of {} links kept)",
                        entry.url,
                        entry.depth,
                        links.len(),
                        content.links.len()
                    );

                    let descend = self.max_depth.map_or(true, |limit| entry.depth < limit);
                    if descend {
                        frontier.extend(&links, entry.depth + 1);
                    }

                    graph.insert(PageRecord {
                        url: entry.url,
                        depth: entry.depth,
                        metrics: outcome.metrics,
                        links,
                        title: content.title.unwrap_or_default(),
                        h1: content.h1.unwrap_or_default(),
                    });
                }
                None => {
                    warn!(
                        "Fetch failed for {}: {}",
                        entry.url,
                        outcome.metrics.error.as_deref().unwrap_or("unknown")
                    );
                    stats.fetch_failures += 1;
                    graph.insert(PageRecord::failed(entry.url, entry.depth, outcome.metrics));
                }
            }
        }

        stats.pages_visited = graph.len();
        stats.urls_seen = frontier.seen_count();
        stats.elapsed_seconds = round2(started.elapsed().as_secs_f64());

        info!(
            "Crawl complete: {} pages visited, {} URLs seen in {}s",
            stats.pages_visited, stats.urls_seen, stats.elapsed_seconds
        );

        Ok(CrawlOutcome {
            graph: categorize(&graph),
            stats,
        })
    }
}
