//! Output sink traits and types
//!
//! This module defines the trait interface for record sinks and the data
//! structure describing a finished run.

use crate::product::ProductRecord;
use crate::state::{DiscoveryOutcome, FailedUrl, FailureKind};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e.to_string())
    }
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary of one catalog run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Site name from the configuration
    pub site: String,

    /// Why listing discovery stopped; None if discovery never ran
    pub outcome: Option<DiscoveryOutcome>,

    // Counts
    pub discovered: usize,
    /// Already captured by a previous run and skipped
    pub skipped: usize,
    pub succeeded: usize,
    /// Queued but never started because the run was stopped
    pub not_attempted: usize,

    pub failures: Vec<FailedUrl>,

    pub elapsed: Duration,

    /// True if a stop was requested during the run
    pub stopped: bool,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Product URLs this run processed
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed()
    }

    /// Returns the success rate as a percentage of attempted URLs
    pub fn success_rate(&self) -> f64 {
        let attempted = self.attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / attempted as f64) * 100.0
    }

    /// Number of failures of the given kind
    pub fn count_failures(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    /// Outcome label, or "not run"
    pub fn outcome_label(&self) -> String {
        self.outcome
            .map_or_else(|| "not run".to_string(), |outcome| outcome.to_string())
    }
}

/// Destination for extracted product records
pub trait RecordSink {
    /// Writes records in the order given
    ///
    /// # Arguments
    ///
    /// * `records` - Records to write
    ///
    /// # Returns
    ///
    /// The number of records written
    fn write_records(&mut self, records: &[ProductRecord]) -> OutputResult<usize>;
}
