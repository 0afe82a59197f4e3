//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of a catalog run,
//! including counts, the discovery outcome and every failed URL.

use crate::output::traits::{OutputResult, RunSummary};
use crate::state::FailureKind;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a run
///
/// # Arguments
///
/// * `summary` - The run summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Shelf-Scout Summary: {}\n\n", summary.site));

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Discovery**: {}\n", summary.outcome_label()));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        summary.elapsed.as_secs_f64()
    ));
    if summary.stopped {
        md.push_str("- **Status**: stopped before completion\n");
    } else {
        md.push_str("- **Status**: completed\n");
    }
    md.push('\n');

    md.push_str("## Products\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Discovered | {} |\n", summary.discovered));
    if summary.skipped > 0 {
        md.push_str(&format!(
            "| Skipped (already scraped) | {} |\n",
            summary.skipped
        ));
    }
    md.push_str(&format!("| Scraped | {} |\n", summary.succeeded));
    md.push_str(&format!(
        "| Fetch failures | {} |\n",
        summary.count_failures(FailureKind::Fetch)
    ));
    md.push_str(&format!(
        "| Extraction failures | {} |\n",
        summary.count_failures(FailureKind::Extraction)
    ));
    if summary.not_attempted > 0 {
        md.push_str(&format!("| Not attempted | {} |\n", summary.not_attempted));
    }
    md.push_str(&format!(
        "\n**Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    if !summary.failures.is_empty() {
        md.push_str("## Failed URLs\n\n");
        md.push_str("| URL | Stage | Reason |\n");
        md.push_str("|-----|-------|--------|\n");
        for failure in &summary.failures {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failure.url,
                failure.kind,
                failure.reason.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md.push_str("---\n\n");
    md.push_str(&format!(
        "*Generated at {}*\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md
}
