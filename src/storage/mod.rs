//! Storage module for persisting traversal progress
//!
//! This module handles checkpoints that let a catalog run resume without
//! re-fetching product pages it already captured:
//! - `ProgressSnapshot`: the durable projection of a run's progress
//! - `ProgressStore`: the backend interface
//! - `JsonProgressStore` and `SqliteProgressStore`: the two backends

mod json;
mod schema;
mod sqlite;
mod traits;

pub use json::JsonProgressStore;
pub use sqlite::SqliteProgressStore;
pub use traits::{ProgressStore, StorageError, StorageResult};

use crate::config::{ProgressBackend, ProgressConfig, SiteConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Durable record of which product URLs a run captured or failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// URLs that produced a record, in processing order
    pub scraped_urls: Vec<String>,

    /// URLs whose fetch or extraction failed
    pub failed_urls: Vec<String>,

    /// Site configuration the run used
    pub site: SiteConfig,

    /// SHA-256 of the configuration file, when the run was started from one
    #[serde(default)]
    pub config_hash: Option<String>,

    /// Seconds since the Unix epoch when the snapshot was taken
    pub timestamp: f64,
}

impl ProgressSnapshot {
    /// Builds a snapshot stamped with the current time
    pub fn capture(
        scraped_urls: Vec<String>,
        failed_urls: Vec<String>,
        site: SiteConfig,
        config_hash: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            scraped_urls,
            failed_urls,
            site,
            config_hash,
            timestamp: now.timestamp_millis() as f64 / 1000.0,
        }
    }

    /// URLs still to process given a fresh discovery pass
    pub fn remaining_work(&self, discovered: &[String]) -> Vec<String> {
        remaining_work(discovered, self)
    }
}

/// Computes the product URLs a resumed run still has to process
///
/// Previously scraped URLs are removed; previously failed URLs stay, since
/// their failures may have been transient. Discovery order is preserved.
pub fn remaining_work(discovered: &[String], snapshot: &ProgressSnapshot) -> Vec<String> {
    let scraped: HashSet<&str> = snapshot.scraped_urls.iter().map(String::as_str).collect();

    discovered
        .iter()
        .filter(|url| !scraped.contains(url.as_str()))
        .cloned()
        .collect()
}

/// Opens the progress store selected by the configuration
///
/// # Arguments
///
/// * `config` - The progress configuration
///
/// # Returns
///
/// * `Ok(Box<dyn ProgressStore + Send>)` - Store ready for use
/// * `Err(StorageError)` - The backing database could not be opened
pub fn open_progress_store(config: &ProgressConfig) -> StorageResult<Box<dyn ProgressStore + Send>> {
    let path = Path::new(&config.path);
    match config.backend {
        ProgressBackend::Json => Ok(Box::new(JsonProgressStore::new(path))),
        ProgressBackend::Sqlite => Ok(Box::new(SqliteProgressStore::new(path)?)),
    }
}
