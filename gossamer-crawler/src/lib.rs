pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod frontier;
pub mod graph;
pub mod page;
pub mod robots;

pub use crawler::{CrawlOutcome, Crawler, ProgressCallback};
pub use error::CrawlError;
pub use frontier::{Frontier, Strategy};
pub use graph::{
    CategorizedLinks, CrawlGraph, CrawlStats, FetchMetrics, PageRecord, SiteGraph, SitePage,
    categorize,
};
pub use robots::RobotsGate;
