//! State module for tracking traversal progress
//!
//! # Components
//!
//! - `TraversalState`: discovered URLs, collected records and failures for one run
//! - `ListingCursor`: position of the listing page loop
//! - `DiscoveryOutcome`: why listing discovery stopped
//! - `FailedUrl`: a product URL that could not be captured, with its cause

mod outcome;
mod traversal;

pub use outcome::{DiscoveryOutcome, FailureKind, ListingCursor};
pub use traversal::{FailedUrl, TraversalState};
