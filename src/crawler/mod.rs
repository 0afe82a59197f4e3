//! Crawler module for catalog traversal
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with pacing and retry logic
//! - Global request throttling shared by all workers
//! - Cooperative cancellation
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod signal;
mod throttle;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, is_retryable_status, Fetcher, PageContent, RetryPolicy};
pub use signal::StopSignal;
pub use throttle::Throttle;

pub use crate::state::DiscoveryOutcome;
