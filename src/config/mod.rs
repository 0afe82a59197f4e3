//! Configuration module for Shelf-Scout
//!
//! This module handles loading, parsing, and validating TOML site configuration.
//!
//! # Example
//!
//! ```no_run
//! use shelf_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site.toml")).unwrap();
//! println!("Scraping {} from {}", config.site.name, config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FallbackSelectors, OutputConfig, PaginationConfig, ProgressBackend, ProgressConfig,
    ScrapingConfig, SelectorConfig, SiteConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_config_content, load_config, load_config_with_hash, parse_config,
};
pub use validation::{validate, validate_site_config};

pub(crate) use validation::check_selector;
