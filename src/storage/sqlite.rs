//! SQLite progress store
//!
//! This module provides a SQLite-based implementation of the ProgressStore trait.

use crate::storage::schema::{initialize_schema, STATUS_FAILED, STATUS_SCRAPED};
use crate::storage::traits::{ProgressStore, StorageError, StorageResult};
use crate::storage::ProgressSnapshot;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Checkpoints retained after each write
const KEEP_SNAPSHOTS: i64 = 3;

/// SQLite progress backend
///
/// Each checkpoint is its own row and the most recent one is loaded. Only the
/// last few are retained.
pub struct SqliteProgressStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteProgressStore {
    /// Opens or creates the progress database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteProgressStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    /// Number of checkpoints stored
    pub fn snapshot_count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn load_urls(&self, snapshot_id: i64, status: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT url FROM snapshot_urls WHERE snapshot_id = ?1 AND status = ?2 ORDER BY position",
        )?;

        let urls = stmt
            .query_map(params![snapshot_id, status], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(urls)
    }
}

impl ProgressStore for SqliteProgressStore {
    fn write_snapshot(&mut self, snapshot: &ProgressSnapshot) -> StorageResult<()> {
        let site_json = serde_json::to_string(&snapshot.site)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO snapshots (taken_at, config_hash, site_json) VALUES (?1, ?2, ?3)",
            params![snapshot.timestamp, snapshot.config_hash, site_json],
        )?;
        let snapshot_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO snapshot_urls (snapshot_id, position, url, status) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, url) in snapshot.scraped_urls.iter().enumerate() {
                stmt.execute(params![snapshot_id, position as i64, url, STATUS_SCRAPED])?;
            }
            for (position, url) in snapshot.failed_urls.iter().enumerate() {
                stmt.execute(params![snapshot_id, position as i64, url, STATUS_FAILED])?;
            }
        }

        tx.execute(
            "DELETE FROM snapshots WHERE id NOT IN (SELECT id FROM snapshots ORDER BY id DESC LIMIT ?1)",
            params![KEEP_SNAPSHOTS],
        )?;

        tx.commit()?;

        tracing::debug!(
            "Checkpoint {} saved to {} ({} scraped, {} failed)",
            snapshot_id,
            self.path.display(),
            snapshot.scraped_urls.len(),
            snapshot.failed_urls.len()
        );
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<ProgressSnapshot>> {
        let latest = self
            .conn
            .query_row(
                "SELECT id, taken_at, config_hash, site_json FROM snapshots ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, timestamp, config_hash, site_json)) = latest else {
            return Ok(None);
        };

        let site = serde_json::from_str(&site_json)
            .map_err(|e| StorageError::Corrupt(format!("snapshot {} site: {}", id, e)))?;

        Ok(Some(ProgressSnapshot {
            scraped_urls: self.load_urls(id, STATUS_SCRAPED)?,
            failed_urls: self.load_urls(id, STATUS_FAILED)?,
            site,
            config_hash,
            timestamp,
        }))
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}
