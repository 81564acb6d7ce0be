use std::collections::{HashSet, VecDeque};
use url::Url;

/// FIFO queue of pending URLs plus the set of URLs already fetched.
///
/// Created per crawl from a single seed and dropped when the crawl returns.
#[derive(Debug)]
pub struct CrawlFrontier {
    queue: VecDeque<Url>,
    visited: HashSet<String>,
    failed: HashSet<String>,
}

impl CrawlFrontier {
    pub fn new(seed: Url) -> Self {
        Self {
            queue: VecDeque::from([seed]),
            visited: HashSet::new(),
            failed: HashSet::new(),
        }
    }

    /// Next URL in breadth-first order
    pub fn pop(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    /// Queue a URL unless it was already fetched. Duplicates in the queue are
    /// skipped when dequeued.
    pub fn push(&mut self, url: Url) -> bool {
        if self.visited.contains(url.as_str()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    pub fn has_failed(&self, url: &Url) -> bool {
        self.failed.contains(url.as_str())
    }

    pub fn mark_visited(&mut self, url: &Url) {
        self.visited.insert(url.to_string());
    }

    pub fn mark_failed(&mut self, url: &Url) {
        self.failed.insert(url.to_string());
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
