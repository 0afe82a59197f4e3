//! Progress store trait and error types

use crate::config::SiteConfig;
use crate::storage::ProgressSnapshot;
use thiserror::Error;

/// Errors that can occur while writing or reading checkpoints
///
/// None of these abort a run; the coordinator logs them and carries on
/// without checkpointing.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable home for traversal checkpoints
///
/// A missing checkpoint is not an error: `load` returns `Ok(None)` and the
/// caller starts fresh.
pub trait ProgressStore {
    /// Persists a snapshot, replacing whatever was current before
    fn write_snapshot(&mut self, snapshot: &ProgressSnapshot) -> StorageResult<()>;

    /// Reads the most recent snapshot, if one exists
    fn load(&self) -> StorageResult<Option<ProgressSnapshot>>;

    /// Short backend description for logs
    fn describe(&self) -> String;

    /// Captures and persists a snapshot of the given progress
    ///
    /// # Arguments
    ///
    /// * `scraped` - URLs that produced a record
    /// * `failed` - URLs that failed to fetch or parse
    /// * `site` - Site configuration the run used
    /// * `config_hash` - Hash of the configuration file, if known
    ///
    /// # Returns
    ///
    /// The snapshot that was written
    fn save(
        &mut self,
        scraped: &[String],
        failed: &[String],
        site: &SiteConfig,
        config_hash: Option<&str>,
    ) -> StorageResult<ProgressSnapshot> {
        let snapshot = ProgressSnapshot::capture(
            scraped.to_vec(),
            failed.to_vec(),
            site.clone(),
            config_hash.map(str::to_string),
        );
        self.write_snapshot(&snapshot)?;
        Ok(snapshot)
    }
}
