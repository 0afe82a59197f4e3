//! JSON file progress store

use crate::storage::traits::{ProgressStore, StorageError, StorageResult};
use crate::storage::ProgressSnapshot;
use std::path::{Path, PathBuf};

/// Keeps the latest snapshot as a pretty-printed JSON document
///
/// Writes go to a sibling temp file that is then renamed over the target;
/// the previous checkpoint stays readable until the rename.
#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ProgressStore for JsonProgressStore {
    fn write_snapshot(&mut self, snapshot: &ProgressSnapshot) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let temp = self.temp_path();
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;

        tracing::debug!(
            "Progress saved to {} ({} scraped, {} failed)",
            self.path.display(),
            snapshot.scraped_urls.len(),
            snapshot.failed_urls.len()
        );
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<ProgressSnapshot>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot = serde_json::from_str(&content).map_err(|e| {
            StorageError::Corrupt(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Some(snapshot))
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
