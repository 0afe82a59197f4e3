//! Output module for records and run summaries
//!
//! This module handles:
//! - Writing extracted records through a [`RecordSink`]
//! - Printing the run summary to the console
//! - Writing the markdown run summary

mod jsonl;
mod markdown;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesSink;
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::print_summary;
pub use traits::{OutputError, OutputResult, RecordSink, RunSummary};
