//! Catalog coordinator - main traversal orchestration logic
//!
//! This module contains the two loops of a catalog run:
//! - The listing loop, which walks paginated listing pages and collects
//!   product URLs until a termination condition is hit
//! - The detail loop, which fetches and extracts every collected URL
//!
//! It also owns checkpointing and resume.

use crate::config::{validate, Config, SiteConfig};
use crate::crawler::{Fetcher, StopSignal};
use crate::extract::Extractor;
use crate::output::RunSummary;
use crate::product::ProductRecord;
use crate::state::{DiscoveryOutcome, FailedUrl, FailureKind, ListingCursor, TraversalState};
use crate::storage::{ProgressSnapshot, ProgressStore, StorageResult};
use crate::url::{build_page_url, is_paginated};
use crate::ScrapeError;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{Instrument, Span};

/// Checkpoint bookkeeping, kept apart from the traversal state so the
/// detail loop can write checkpoints while the fetch stream is live
struct Checkpointer {
    store: Option<Box<dyn ProgressStore + Send>>,
    every: usize,
    site: SiteConfig,
    config_hash: Option<String>,

    /// URLs captured by the run being resumed
    previously_scraped: Vec<String>,
}

impl Checkpointer {
    /// Writes a snapshot if a store is attached
    fn write(&mut self, state: &TraversalState) -> StorageResult<Option<ProgressSnapshot>> {
        let Some(store) = self.store.as_mut() else {
            return Ok(None);
        };

        let mut seen: HashSet<&str> = HashSet::new();
        let scraped: Vec<String> = self
            .previously_scraped
            .iter()
            .map(String::as_str)
            .chain(state.records().iter().map(|r| r.source_url.as_str()))
            .filter(|url| seen.insert(*url))
            .map(str::to_string)
            .collect();

        let snapshot = store.save(
            &scraped,
            &state.failed_urls(),
            &self.site,
            self.config_hash.as_deref(),
        )?;
        tracing::debug!(
            "Checkpoint written to {}: {} scraped, {} failed",
            store.describe(),
            snapshot.scraped_urls.len(),
            snapshot.failed_urls.len()
        );
        Ok(Some(snapshot))
    }

    /// Writes a snapshot every `every` records; failures are logged only
    fn maybe_write(&mut self, state: &TraversalState) {
        let records = state.records().len();
        if self.every == 0 || records == 0 || records % self.every != 0 {
            return;
        }
        if let Err(e) = self.write(state) {
            tracing::warn!("Checkpoint after {} records failed: {}", records, e);
        }
    }
}

/// Main catalog coordinator structure
pub struct Coordinator {
    site: SiteConfig,
    max_products: Option<usize>,
    workers: usize,
    fetcher: Fetcher,
    extractor: Extractor,
    state: TraversalState,
    outcome: Option<DiscoveryOutcome>,
    checkpointer: Checkpointer,
    stop: StopSignal,

    // Per-run counters for the summary
    skipped: usize,
    not_attempted: usize,
    elapsed: Duration,

    span: Span,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// The configuration is validated and every selector compiled here, so
    /// a broken configuration fails before any network activity.
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration
    /// * `span` - Span all coordinator work runs under; the fetcher and
    ///   extractor log under child spans of it
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScrapeError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: &Config, span: Span) -> Result<Self, ScrapeError> {
        validate(config)?;

        let extractor = Extractor::new(
            &config.site,
            tracing::debug_span!(parent: &span, "extract"),
        )?;
        let fetcher = Fetcher::new(
            &config.scraping,
            tracing::debug_span!(parent: &span, "fetch"),
        )?;

        Ok(Self {
            site: config.site.clone(),
            max_products: config.scraping.max_products,
            workers: config.scraping.workers.max(1),
            fetcher,
            extractor,
            state: TraversalState::new(),
            outcome: None,
            checkpointer: Checkpointer {
                store: None,
                every: config.progress.checkpoint_every,
                site: config.site.clone(),
                config_hash: None,
                previously_scraped: Vec::new(),
            },
            stop: StopSignal::new(),
            skipped: 0,
            not_attempted: 0,
            elapsed: Duration::ZERO,
            span,
        })
    }

    /// Attaches the store checkpoints are written to and resumed from
    pub fn with_progress_store(mut self, store: Box<dyn ProgressStore + Send>) -> Self {
        self.checkpointer.store = Some(store);
        self
    }

    /// Records the configuration file hash in every snapshot
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.checkpointer.config_hash = Some(hash.into());
        self
    }

    /// Handle that stops the run when tripped
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    // ===== Runs =====

    /// Discovers every product URL and scrapes each one
    ///
    /// # Arguments
    ///
    /// * `start_url` - Listing root; page URLs are built from it
    ///
    /// # Returns
    ///
    /// The extracted records in discovery order. Failures are available
    /// through [`failures`](Self::failures).
    pub async fn scrape_catalog(&mut self, start_url: &str) -> &[ProductRecord] {
        let span = self.span.clone();
        self.run(start_url, None).instrument(span).await;
        self.state.records()
    }

    /// Continues a previous run from the latest checkpoint
    ///
    /// Discovery runs again in full. URLs the checkpoint lists as scraped are
    /// skipped; previously failed URLs are attempted again. Without a store
    /// or a checkpoint this is the same as [`scrape_catalog`](Self::scrape_catalog).
    pub async fn resume_catalog(&mut self, start_url: &str) -> &[ProductRecord] {
        let snapshot = self.load_snapshot();
        if snapshot.is_none() {
            tracing::info!("No progress snapshot found, starting fresh");
        }

        let span = self.span.clone();
        self.run(start_url, snapshot).instrument(span).await;
        self.state.records()
    }

    async fn run(&mut self, start_url: &str, resume_from: Option<ProgressSnapshot>) {
        let started = Instant::now();
        let outcome = self.discover(start_url).await;

        let urls = match resume_from {
            None => {
                tracing::info!(
                    "Discovery finished ({}): {} product URLs",
                    outcome,
                    self.state.discovered_count()
                );
                self.state.discovered().to_vec()
            }
            Some(snapshot) => {
                if snapshot.site != self.site {
                    tracing::warn!("Site configuration changed since the snapshot was taken");
                }
                if let (Some(old), Some(new)) =
                    (&snapshot.config_hash, &self.checkpointer.config_hash)
                {
                    if old != new {
                        tracing::warn!("Config file hash changed since the snapshot was taken");
                    }
                }

                let remaining = snapshot.remaining_work(self.state.discovered());
                self.skipped = self.state.discovered_count() - remaining.len();
                self.checkpointer.previously_scraped = snapshot.scraped_urls;

                tracing::info!(
                    "Resuming ({}): {} product URLs, {} already scraped, {} remaining",
                    outcome,
                    self.state.discovered_count(),
                    self.skipped,
                    remaining.len()
                );
                remaining
            }
        };

        self.process_details(urls).await;
        self.finish(started);
    }

    /// Writes a checkpoint now
    ///
    /// # Returns
    ///
    /// * `Ok(Some(snapshot))` - Snapshot written
    /// * `Ok(None)` - No progress store attached
    /// * `Err(StorageError)` - Write failed
    pub fn checkpoint(&mut self) -> StorageResult<Option<ProgressSnapshot>> {
        self.checkpointer.write(&self.state)
    }

    // ===== Listing Loop =====

    /// Walks listing pages and collects product URLs
    ///
    /// # Returns
    ///
    /// Why discovery stopped
    pub async fn discover(&mut self, start_url: &str) -> DiscoveryOutcome {
        let pattern = self.site.pagination.pattern.clone();
        let max_pages = self.site.pagination.max_pages;
        *self.state.cursor_mut() = ListingCursor::start();

        let outcome = if !is_paginated(pattern.as_deref()) {
            self.discover_single(start_url).await
        } else {
            loop {
                let Some(page) = self.state.cursor().page() else {
                    break DiscoveryOutcome::PageLimit;
                };
                if self.stop.is_stopped() {
                    break DiscoveryOutcome::Cancelled;
                }

                let page_url = build_page_url(start_url, pattern.as_deref(), page);
                tracing::info!("Scraping listing page {}: {}", page, page_url);

                let links = self.read_listing(&page_url).await;
                if links.is_empty() {
                    tracing::info!("No products found on page {}, stopping pagination", page);
                    break DiscoveryOutcome::Exhausted { page };
                }

                let added = self.state.add_discovered(links);
                tracing::debug!(
                    "Page {}: {} new product URLs ({} total)",
                    page,
                    added,
                    self.state.discovered_count()
                );

                if self.apply_cap() {
                    break DiscoveryOutcome::Capped;
                }
                if page >= max_pages {
                    tracing::info!("Reached max pages ({})", max_pages);
                    break DiscoveryOutcome::PageLimit;
                }

                self.state.cursor_mut().advance();
            }
        };

        *self.state.cursor_mut() = ListingCursor::Done;
        self.outcome = Some(outcome);
        outcome
    }

    async fn discover_single(&mut self, start_url: &str) -> DiscoveryOutcome {
        if self.stop.is_stopped() {
            return DiscoveryOutcome::Cancelled;
        }

        tracing::info!("Scraping single listing page: {}", start_url);
        let links = self.read_listing(start_url).await;
        if links.is_empty() {
            tracing::info!("No products found on the listing page");
            return DiscoveryOutcome::Exhausted { page: 1 };
        }
        self.state.add_discovered(links);

        if self.apply_cap() {
            DiscoveryOutcome::Capped
        } else {
            DiscoveryOutcome::SinglePage
        }
    }

    /// Fetches a listing page; a failed fetch counts as an empty page
    async fn read_listing(&self, page_url: &str) -> Vec<String> {
        match self.fetcher.fetch(page_url, None).await {
            Ok(page) => self.extractor.extract_links(&page.body, &page.final_url),
            Err(e) => {
                tracing::warn!("Failed to fetch listing page: {}", e);
                Vec::new()
            }
        }
    }

    /// Truncates discovery to the product cap; true if the cap was reached
    fn apply_cap(&mut self) -> bool {
        match self.max_products {
            Some(max) if self.state.discovered_count() >= max => {
                self.state.truncate_discovered(max);
                tracing::info!("Reached max products limit ({})", max);
                true
            }
            _ => false,
        }
    }

    // ===== Detail Loop =====

    /// Fetches and extracts each URL, in order, with bounded concurrency
    async fn process_details(&mut self, urls: Vec<String>) {
        let total = urls.len();
        let fetcher = &self.fetcher;
        let extractor = &self.extractor;
        let stop = &self.stop;

        let mut results = stream::iter(urls)
            .map(|url| async move {
                if stop.is_stopped() {
                    return None;
                }
                let result = match fetcher.fetch(&url, None).await {
                    Ok(page) => extractor
                        .try_extract_record(&page.body, &url)
                        .map_err(|e| (FailureKind::Extraction, e.to_string())),
                    Err(e) => Err((FailureKind::Fetch, e.to_string())),
                };
                Some((url, result))
            })
            .buffered(self.workers);

        let mut processed = 0;
        while let Some(result) = results.next().await {
            let Some((url, result)) = result else {
                self.not_attempted += 1;
                continue;
            };
            processed += 1;

            match result {
                Ok(record) => {
                    tracing::info!("[{}/{}] Scraped: {}", processed, total, record.name);
                    self.state.record_success(record);
                    self.checkpointer.maybe_write(&self.state);
                }
                Err((kind, reason)) => {
                    tracing::warn!("[{}/{}] Failed {}: {}", processed, total, url, reason);
                    self.state.record_failure(url, kind, reason);
                }
            }
        }

        if self.not_attempted > 0 {
            tracing::info!(
                "Stop requested: {} product URLs not attempted",
                self.not_attempted
            );
        }
    }

    fn finish(&mut self, started: Instant) {
        self.elapsed = started.elapsed();

        if let Err(e) = self.checkpoint() {
            tracing::warn!("Final checkpoint failed: {}", e);
        }

        tracing::info!(
            "Run finished in {:.1}s: {} scraped, {} failed",
            self.elapsed.as_secs_f64(),
            self.state.records().len(),
            self.state.failures().len()
        );
    }

    fn load_snapshot(&self) -> Option<ProgressSnapshot> {
        let store = self.checkpointer.store.as_ref()?;
        match store.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Could not load snapshot from {}: {}", store.describe(), e);
                None
            }
        }
    }

    // ===== Accessors =====

    pub fn records(&self) -> &[ProductRecord] {
        self.state.records()
    }

    pub fn failures(&self) -> &[FailedUrl] {
        self.state.failures()
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    pub fn outcome(&self) -> Option<DiscoveryOutcome> {
        self.outcome
    }

    /// Summary of the run so far
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            site: self.site.name.clone(),
            outcome: self.outcome,
            discovered: self.state.discovered_count(),
            skipped: self.skipped,
            succeeded: self.state.records().len(),
            not_attempted: self.not_attempted,
            failures: self.state.failures().to_vec(),
            elapsed: self.elapsed,
            stopped: self.stop.is_stopped(),
        }
    }
}
