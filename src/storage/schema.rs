//! Database schema definitions for the SQLite progress store

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per checkpoint written
CREATE TABLE IF NOT EXISTS snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    taken_at REAL NOT NULL,
    config_hash TEXT,
    site_json TEXT NOT NULL
);

-- URLs recorded by a checkpoint, in run order
CREATE TABLE IF NOT EXISTS snapshot_urls (
    snapshot_id INTEGER NOT NULL REFERENCES snapshots(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    PRIMARY KEY (snapshot_id, status, position)
);

CREATE INDEX IF NOT EXISTS idx_snapshot_urls_snapshot ON snapshot_urls(snapshot_id);
"#;

/// URL status strings stored in `snapshot_urls.status`
pub const STATUS_SCRAPED: &str = "scraped";
pub const STATUS_FAILED: &str = "failed";

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
