use crate::product::ProductRecord;
use crate::state::{FailureKind, ListingCursor};
use std::collections::HashSet;

/// A product URL that could not be captured
#[derive(Debug, Clone, PartialEq)]
pub struct FailedUrl {
    pub url: String,
    pub kind: FailureKind,
    /// Human-readable cause
    pub reason: String,
}

/// Everything one traversal run has learned so far
///
/// Owned by the coordinator and mutated only by its loops. Discovered URLs
/// keep first-seen order and are unique by exact string equality. Each
/// processed URL ends up either in `records` or in `failures`, never both.
#[derive(Debug, Clone)]
pub struct TraversalState {
    discovered: Vec<String>,
    seen: HashSet<String>,
    records: Vec<ProductRecord>,
    failures: Vec<FailedUrl>,
    cursor: ListingCursor,
}

impl TraversalState {
    pub fn new() -> Self {
        Self {
            discovered: Vec::new(),
            seen: HashSet::new(),
            records: Vec::new(),
            failures: Vec::new(),
            cursor: ListingCursor::start(),
        }
    }

    /// Adds URLs not seen before, preserving order
    ///
    /// # Returns
    ///
    /// The number of URLs that were new
    pub fn add_discovered<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.discovered.len();
        for url in urls {
            if self.seen.insert(url.clone()) {
                self.discovered.push(url);
            }
        }
        self.discovered.len() - before
    }

    /// Keeps only the first `max` discovered URLs
    pub fn truncate_discovered(&mut self, max: usize) {
        if self.discovered.len() > max {
            for url in self.discovered.drain(max..) {
                self.seen.remove(&url);
            }
        }
    }

    pub fn discovered(&self) -> &[String] {
        &self.discovered
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    pub fn record_success(&mut self, record: ProductRecord) {
        self.records.push(record);
    }

    pub fn record_failure(&mut self, url: impl Into<String>, kind: FailureKind, reason: impl Into<String>) {
        self.failures.push(FailedUrl {
            url: url.into(),
            kind,
            reason: reason.into(),
        });
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn failures(&self) -> &[FailedUrl] {
        &self.failures
    }

    pub fn failed_urls(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.url.clone()).collect()
    }

    pub fn cursor(&self) -> ListingCursor {
        self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut ListingCursor {
        &mut self.cursor
    }
}

impl Default for TraversalState {
    fn default() -> Self {
        Self::new()
    }
}
