use std::collections::HashMap;

use chrono::Utc;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// File suffixes routed to the video bucket by [`CategorizedLinks::classify`].
pub const VIDEO_EXTENSIONS: [&str; 3] = [".mp4", ".webm", ".avi"];

/// File suffixes routed to the image bucket by [`CategorizedLinks::classify`].
pub const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

/// Measurements taken while fetching a single URL.
///
/// Fields stay `None` when the corresponding measurement never happened, e.g.
/// a connection that was refused has no status code and no load time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchMetrics {
    pub status_code: Option<u16>,
    /// Wall-clock fetch duration in seconds, rounded to two decimals.
    pub load_time: Option<f64>,
    /// Body size in kilobytes, rounded to two decimals.
    pub page_size_kb: Option<f64>,
    /// Human-readable failure description; `None` means the fetch succeeded.
    pub error: Option<String>,
}

impl FetchMetrics {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything the crawler recorded about one visited URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    /// Link distance from the seed at first discovery.
    pub depth: usize,
    pub metrics: FetchMetrics,
    /// Outgoing links, resolved and filtered, in document order.
    pub links: Vec<String>,
    pub title: String,
    pub h1: String,
}

impl PageRecord {
    /// Record for a URL whose fetch failed. Metrics carry the error; the
    /// content fields stay empty.
    pub fn failed(url: impl Into<String>, depth: usize, metrics: FetchMetrics) -> Self {
        Self {
            url: url.into(),
            depth,
            metrics,
            links: Vec::new(),
            title: String::new(),
            h1: String::new(),
        }
    }
}

/// URL-keyed map of [`PageRecord`]s in visitation order.
///
/// Serializes as a JSON object whose keys appear in the order the pages were
/// visited, which is also what the JSON export relies on.
#[derive(Debug, Clone, Default)]
pub struct CrawlGraph {
    pages: Vec<PageRecord>,
    index: HashMap<String, usize>,
}

impl CrawlGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record. Returns `false` (and drops the record) if the URL is
    /// already present; each URL is recorded at most once.
    pub fn insert(&mut self, record: PageRecord) -> bool {
        if self.index.contains_key(&record.url) {
            return false;
        }
        self.index.insert(record.url.clone(), self.pages.len());
        self.pages.push(record);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.index.get(url).map(|&i| &self.pages[i])
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Records in visitation order.
    pub fn pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.url.as_str())
    }
}

impl Serialize for CrawlGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pages.len()))?;
        for page in &self.pages {
            map.serialize_entry(&page.url, page)?;
        }
        map.end()
    }
}

/// A page's outgoing links partitioned into five buckets.
///
/// The partition is total: every link lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorizedLinks {
    #[serde(rename = "http(s)_links")]
    pub http_links: Vec<String>,
    pub mail_links: Vec<String>,
    pub video_links: Vec<String>,
    pub image_links: Vec<String>,
    pub other_links: Vec<String>,
}

impl CategorizedLinks {
    /// Buckets each link by the first matching rule: `mailto:` prefix, then
    /// video suffix, then image suffix, then `http(s)://` prefix, then the
    /// catch-all. Prefix and suffix checks are case-insensitive.
    pub fn classify(links: &[String]) -> Self {
        let mut buckets = Self::default();
        for link in links {
            let lower = link.to_lowercase();
            if lower.starts_with("mailto:") {
                buckets.mail_links.push(link.clone());
            } else if VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
                buckets.video_links.push(link.clone());
            } else if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
                buckets.image_links.push(link.clone());
            } else if lower.starts_with("http://") || lower.starts_with("https://") {
                buckets.http_links.push(link.clone());
            } else {
                buckets.other_links.push(link.clone());
            }
        }
        buckets
    }

    pub fn total(&self) -> usize {
        self.http_links.len()
            + self.mail_links.len()
            + self.video_links.len()
            + self.image_links.len()
            + self.other_links.len()
    }
}

/// A [`PageRecord`] with its links categorized; the unit of the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePage {
    pub url: String,
    pub depth: usize,
    pub metrics: FetchMetrics,
    pub title: String,
    pub h1: String,
    pub categorized_links: CategorizedLinks,
}

/// Finalized crawl output: URL-keyed, visitation-ordered categorized pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteGraph {
    pages: Vec<SitePage>,
    index: HashMap<String, usize>,
}

impl SiteGraph {
    fn insert(&mut self, page: SitePage) {
        self.index.insert(page.url.clone(), self.pages.len());
        self.pages.push(page);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&SitePage> {
        self.index.get(url).map(|&i| &self.pages[i])
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in visitation order.
    pub fn pages(&self) -> impl Iterator<Item = &SitePage> {
        self.pages.iter()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.url.as_str())
    }
}

impl Serialize for SiteGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pages.len()))?;
        for page in &self.pages {
            map.serialize_entry(&page.url, page)?;
        }
        map.end()
    }
}

/// Finalizes a crawl graph into its categorized site view. Pure with respect
/// to the input: running it twice on the same graph yields equal results.
pub fn categorize(graph: &CrawlGraph) -> SiteGraph {
    let mut site = SiteGraph::default();
    for record in graph.pages() {
        site.insert(SitePage {
            url: record.url.clone(),
            depth: record.depth,
            metrics: record.metrics.clone(),
            title: record.title.clone(),
            h1: record.h1.clone(),
            categorized_links: CategorizedLinks::classify(&record.links),
        });
    }
    site
}

/// Counters accumulated over one crawl run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// RFC 3339 timestamp taken when the crawl started.
    pub started_at: String,
    pub elapsed_seconds: f64,
    /// URLs with a record in the graph (successful or failed fetches).
    pub pages_visited: usize,
    /// Unique URLs that ever entered the frontier, visited or not.
    pub urls_seen: usize,
    /// Popped URLs skipped for having a non-web scheme.
    pub skipped_non_web: usize,
    /// Popped URLs denied by robots.txt; these leave no graph record.
    pub blocked_by_robots: usize,
    /// Fetch attempts that ended in a failure record.
    pub fetch_failures: usize,
    /// True when the crawl was interrupted before the frontier drained.
    pub cancelled: bool,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now().to_rfc3339(),
            elapsed_seconds: 0.0,
            pages_visited: 0,
            urls_seen: 0,
            skipped_non_web: 0,
            blocked_by_robots: 0,
            fetch_failures: 0,
            cancelled: false,
        }
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, links: &[&str]) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            depth: 0,
            metrics: FetchMetrics {
                status_code: Some(200),
                load_time: Some(0.05),
                page_size_kb: Some(1.2),
                error: None,
            },
            links: links.iter().map(|s| s.to_string()).collect(),
            title: String::new(),
            h1: String::new(),
        }
    }

    #[test]
    fn test_classify_partitions_every_link() {
        let links = vec![
            "https://example.com/about".to_string(),
            "mailto:team@example.com".to_string(),
            "https://cdn.example.com/intro.mp4".to_string(),
            "https://cdn.example.com/logo.PNG".to_string(),
            "tel:+15551234567".to_string(),
        ];
        let buckets = CategorizedLinks::classify(&links);

        assert_eq!(buckets.http_links, vec!["https://example.com/about"]);
        assert_eq!(buckets.mail_links, vec!["mailto:team@example.com"]);
        assert_eq!(buckets.video_links, vec!["https://cdn.example.com/intro.mp4"]);
        assert_eq!(buckets.image_links, vec!["https://cdn.example.com/logo.PNG"]);
        assert_eq!(buckets.other_links, vec!["tel:+15551234567"]);
        assert_eq!(buckets.total(), links.len());
    }

    #[test]
    fn test_classify_media_suffix_beats_http_prefix() {
        let links = vec!["https://example.com/clip.webm".to_string()];
        let buckets = CategorizedLinks::classify(&links);

        assert!(buckets.http_links.is_empty());
        assert_eq!(buckets.video_links.len(), 1);
    }

    #[test]
    fn test_classify_empty_input() {
        let buckets = CategorizedLinks::classify(&[]);
        assert_eq!(buckets, CategorizedLinks::default());
        assert_eq!(buckets.total(), 0);
    }

    #[test]
    fn test_graph_insert_rejects_duplicate_url() {
        let mut graph = CrawlGraph::new();
        assert!(graph.insert(record("https://a.test/", &[])));
        assert!(!graph.insert(record("https://a.test/", &["https://a.test/x"])));

        assert_eq!(graph.len(), 1);
        // First record wins.
        assert!(graph.get("https://a.test/").unwrap().links.is_empty());
    }

    #[test]
    fn test_graph_serializes_in_visitation_order() {
        let mut graph = CrawlGraph::new();
        graph.insert(record("https://a.test/c", &[]));
        graph.insert(record("https://a.test/a", &[]));
        graph.insert(record("https://a.test/b", &[]));

        let json = serde_json::to_string(&graph).unwrap();
        let c = json.find("https://a.test/c").unwrap();
        let a = json.find("https://a.test/a").unwrap();
        let b = json.find("https://a.test/b").unwrap();
        assert!(c < a && a < b);
    }

    #[test]
    fn test_categorize_keeps_order_and_metadata() {
        let mut graph = CrawlGraph::new();
        let mut first = record("https://a.test/", &["https://a.test/pic.jpg"]);
        first.depth = 0;
        first.title = "Home".to_string();
        graph.insert(first);
        let mut second = record("https://a.test/about", &[]);
        second.depth = 1;
        graph.insert(second);

        let site = categorize(&graph);
        assert_eq!(
            site.urls().collect::<Vec<_>>(),
            vec!["https://a.test/", "https://a.test/about"]
        );
        let home = site.get("https://a.test/").unwrap();
        assert_eq!(home.title, "Home");
        assert_eq!(home.categorized_links.image_links.len(), 1);
        assert_eq!(home.depth, 0);
    }

    #[test]
    fn test_categorize_is_idempotent() {
        let mut graph = CrawlGraph::new();
        graph.insert(record(
            "https://a.test/",
            &[
                "https://a.test/about",
                "mailto:hi@a.test",
                "https://a.test/demo.avi",
            ],
        ));

        assert_eq!(categorize(&graph), categorize(&graph));
    }

    #[test]
    fn test_site_graph_export_uses_original_bucket_names() {
        let mut graph = CrawlGraph::new();
        graph.insert(record("https://a.test/", &["https://a.test/about"]));
        let site = categorize(&graph);

        let json = serde_json::to_string_pretty(&site).unwrap();
        assert!(json.contains("\"http(s)_links\""));
        assert!(json.contains("\"categorized_links\""));
        assert!(json.contains("\"page_size_kb\""));
    }

    #[test]
    fn test_failed_record_has_empty_content() {
        let metrics = FetchMetrics {
            status_code: Some(500),
            load_time: Some(0.1),
            page_size_kb: None,
            error: Some("HTTP 500 Internal Server Error".to_string()),
        };
        let rec = PageRecord::failed("https://a.test/boom", 2, metrics);

        assert!(!rec.metrics.is_success());
        assert!(rec.links.is_empty());
        assert!(rec.title.is_empty());
        assert_eq!(rec.depth, 2);
    }
}
