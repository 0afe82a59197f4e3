//! Shelf-Scout: a polite product catalog harvester
//!
//! This crate walks paginated catalog listings, visits every discovered product
//! page and turns it into a normalized [`ProductRecord`] through a configurable
//! chain of CSS selectors with generic fallbacks.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod product;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Shelf-Scout operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
///
/// These are the only errors that abort a run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for {field}: {selector}")]
    InvalidSelector { field: String, selector: String },
}

/// Failure to obtain a page after all retries
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url} after {attempts} attempt(s)")]
    Status {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("Request timeout for {url} after {attempts} attempt(s)")]
    Timeout { url: String, attempts: u32 },

    #[error("Network error for {url} after {attempts} attempt(s): {message}")]
    Network {
        url: String,
        message: String,
        attempts: u32,
    },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Invalid request URL: {url}")]
    InvalidUrl { url: String },
}

impl FetchError {
    /// The URL the failed request was made for
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url, .. }
            | Self::Network { url, .. }
            | Self::Body { url, .. }
            | Self::InvalidUrl { url } => url,
        }
    }
}

/// Page structure did not yield a usable product record
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No product name found on {url}")]
    MissingName { url: String },

    #[error("Invalid product URL: {url}")]
    InvalidUrl { url: String },
}

/// Result type alias for Shelf-Scout operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, DiscoveryOutcome, Fetcher, StopSignal};
pub use extract::Extractor;
pub use product::{Availability, ProductRecord};
pub use state::TraversalState;
pub use storage::{ProgressSnapshot, ProgressStore};
