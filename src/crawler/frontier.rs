//! Per-site crawl frontier
//!
//! The frontier is a FIFO queue of pending URLs plus a visited set. Duplicates
//! are allowed into the queue and are dropped when popped, so a URL found
//! twice on a page costs a queue slot but never a second request.

use crate::state::UrlState;
use std::collections::{HashMap, HashSet, VecDeque};
use url::Url;

/// FIFO frontier with visited-set deduplication
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs that have been popped for processing
    visited: HashSet<String>,

    /// Pending URLs in discovery order
    queue: VecDeque<Url>,

    /// Terminal outcome of each visited URL
    outcomes: HashMap<String, UrlState>,

    /// Queue entries dropped because they were already visited
    duplicates_skipped: usize,
}

impl Frontier {
    /// Creates a frontier seeded with `seeds`, in order
    pub fn new(seeds: impl IntoIterator<Item = Url>) -> Self {
        Self {
            queue: seeds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Enqueues a URL without checking whether it was seen before
    pub fn push(&mut self, url: Url) {
        self.queue.push_back(url);
    }

    pub fn extend(&mut self, urls: impl IntoIterator<Item = Url>) {
        self.queue.extend(urls);
    }

    /// Pops the earliest unvisited URL and marks it visited
    ///
    /// Already-visited entries are discarded along the way. Returns `None`
    /// when the queue is exhausted.
    pub fn next_unvisited(&mut self) -> Option<Url> {
        while let Some(url) = self.queue.pop_front() {
            if self.visited.insert(url.as_str().to_string()) {
                return Some(url);
            }
            self.duplicates_skipped += 1;
            tracing::trace!("Skipping already visited {}", url);
        }
        None
    }

    /// Records the terminal outcome of a visited URL
    pub fn record(&mut self, url: &Url, state: UrlState) {
        debug_assert!(
            self.state_of(url)
                .is_some_and(|current| current.can_transition_to(state)),
            "invalid transition to {} for {}",
            state,
            url
        );
        self.outcomes.insert(url.as_str().to_string(), state);
    }

    /// State of a URL: its outcome once recorded, `Queued` while pending
    pub fn state_of(&self, url: &Url) -> Option<UrlState> {
        if let Some(state) = self.outcomes.get(url.as_str()) {
            return Some(*state);
        }
        if self.visited.contains(url.as_str()) || self.queue.contains(url) {
            return Some(UrlState::Queued);
        }
        None
    }

    /// Number of visited URLs that ended in `state`
    pub fn count(&self, state: UrlState) -> usize {
        self.outcomes.values().filter(|s| **s == state).count()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn duplicates_skipped(&self) -> usize {
        self.duplicates_skipped
    }
}
