use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use crate::error::CrawlError;

/// Traversal order for the crawl frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Visit pages level by level (FIFO queue).
    BreadthFirst,
    /// Follow each branch to the bottom before backtracking (LIFO stack).
    DepthFirst,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::BreadthFirst => "bfs",
            Strategy::DepthFirst => "dfs",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bfs" => Ok(Strategy::BreadthFirst),
            "dfs" => Ok(Strategy::DepthFirst),
            other => Err(CrawlError::Configuration(format!(
                "unknown crawl strategy '{other}' (expected 'bfs' or 'dfs')"
            ))),
        }
    }
}

/// A URL waiting to be visited, tagged with its link distance from the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize,
}

/// The set of URLs scheduled for crawling.
///
/// The frontier owns the dedup set: a URL enters at most once for the
/// lifetime of the crawl, even after it has been popped. Pop order follows
/// the configured [`Strategy`].
#[derive(Debug)]
pub struct Frontier {
    strategy: Strategy,
    entries: VecDeque<FrontierEntry>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            entries: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Schedules a URL at the given depth. Returns `false` (and changes
    /// nothing) if the URL was ever pushed before.
    pub fn push(&mut self, url: impl Into<String>, depth: usize) -> bool {
        let url = url.into();
        if !self.seen.insert(url.clone()) {
            return false;
        }
        self.entries.push_back(FrontierEntry { url, depth });
        true
    }

    /// Schedules a page's outgoing links at the given depth.
    ///
    /// Breadth-first keeps document order. Depth-first pushes in reverse so
    /// that the first link on the page sits on top of the stack and gets
    /// explored before its siblings. Returns how many links were new.
    pub fn extend<'a, I>(&mut self, links: I, depth: usize) -> usize
    where
        I: IntoIterator<Item = &'a String>,
        I::IntoIter: DoubleEndedIterator,
    {
        let links = links.into_iter();
        match self.strategy {
            Strategy::BreadthFirst => links.filter(|url| self.push(url.as_str(), depth)).count(),
            Strategy::DepthFirst => links
                .rev()
                .filter(|url| self.push(url.as_str(), depth))
                .count(),
        }
    }

    /// Removes and returns the next URL to visit, or `None` when exhausted.
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        match self.strategy {
            Strategy::BreadthFirst => self.entries.pop_front(),
            Strategy::DepthFirst => self.entries.pop_back(),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Number of URLs still waiting to be visited.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of unique URLs ever scheduled, popped or not.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
