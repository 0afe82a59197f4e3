//! Console run summary

use crate::output::traits::RunSummary;
use crate::state::FailureKind;

/// Prints a run summary to stdout
///
/// # Arguments
///
/// * `summary` - The run to describe
/// * `show_failed` - Also list every failed URL with its reason
pub fn print_summary(summary: &RunSummary, show_failed: bool) {
    println!("=== Scrape Summary: {} ===\n", summary.site);

    println!("Discovery: {}", summary.outcome_label());
    println!("Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    if summary.stopped {
        println!("Run was stopped before completion");
    }
    println!();

    println!("Products:");
    println!("  Discovered: {}", summary.discovered);
    if summary.skipped > 0 {
        println!("  Skipped (already scraped): {}", summary.skipped);
    }
    println!("  Scraped: {}", summary.succeeded);
    println!(
        "  Failed: {} ({} fetch, {} extraction)",
        summary.failed(),
        summary.count_failures(FailureKind::Fetch),
        summary.count_failures(FailureKind::Extraction)
    );
    if summary.not_attempted > 0 {
        println!("  Not attempted: {}", summary.not_attempted);
    }
    println!();

    if show_failed && !summary.failures.is_empty() {
        println!("Failed URLs ({}):", summary.failed());
        for failure in &summary.failures {
            println!("  - {} [{}] {}", failure.url, failure.kind, failure.reason);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} product pages)",
        summary.success_rate(),
        summary.succeeded,
        summary.attempted()
    );
}
