//! Shelf-Scout main entry point
//!
//! This is the command-line interface for the Shelf-Scout catalog harvester.

use anyhow::Context;
use clap::Parser;
use shelf_scout::config::{load_config_with_hash, validate, Config};
use shelf_scout::output::{generate_markdown_summary, print_summary, JsonLinesSink, RecordSink};
use shelf_scout::storage::open_progress_store;
use shelf_scout::url::is_paginated;
use shelf_scout::Coordinator;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shelf-Scout: A polite product catalog harvester
///
/// Shelf-Scout walks a shop's paginated listing pages, visits every product
/// page it finds and writes one normalized record per product. Progress is
/// checkpointed so an interrupted run can pick up where it left off.
#[derive(Parser, Debug)]
#[command(name = "shelf-scout")]
#[command(version = "1.0.0")]
#[command(about = "A polite product catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML site configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume from the last checkpoint (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a fresh run, ignoring any checkpoint
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Listing URL to start from instead of the configured base URL
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Stop discovery after this many unique product URLs
    #[arg(long, value_name = "N")]
    max_products: Option<usize>,

    /// Number of concurrent product page fetches
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Validate config and show the plan without making any request
    #[arg(long)]
    dry_run: bool,

    /// List every failed URL with its reason in the console summary
    #[arg(long)]
    show_failed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration after command-line overrides")?;

    let start_url = cli
        .start_url
        .clone()
        .unwrap_or_else(|| config.site.base_url.clone());

    if cli.dry_run {
        handle_dry_run(&config, &start_url, cli.fresh);
        return Ok(());
    }

    handle_scrape(config, config_hash, &start_url, cli.fresh, cli.show_failed).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_scout=info,warn"),
            1 => EnvFilter::new("shelf_scout=debug,info"),
            2 => EnvFilter::new("shelf_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_products) = cli.max_products {
        config.scraping.max_products = Some(max_products);
    }
    if let Some(workers) = cli.workers {
        config.scraping.workers = workers;
    }
}

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config, start_url: &str, fresh: bool) {
    println!("=== Shelf-Scout Dry Run ===\n");

    println!("Site: {}", config.site.name);
    println!("  Start URL: {}", start_url);
    match config.site.pagination.pattern.as_deref() {
        Some(pattern) if is_paginated(Some(pattern)) => {
            println!("  Pagination: {}{}", start_url, pattern);
            println!("  Max pages: {}", config.site.pagination.max_pages);
        }
        _ => println!("  Pagination: none (single listing page)"),
    }
    println!("  Product links: {}", config.site.selectors.product_links);

    println!("\nScraping:");
    println!("  Delay: {}ms", config.scraping.delay_ms);
    println!("  Timeout: {}s", config.scraping.timeout_secs);
    println!(
        "  Retries: {} (backoff {}ms..{}ms)",
        config.scraping.retry_attempts, config.scraping.backoff_base_ms, config.scraping.backoff_max_ms
    );
    match config.scraping.max_products {
        Some(max) => println!("  Max products: {}", max),
        None => println!("  Max products: unlimited"),
    }
    println!("  Workers: {}", config.scraping.workers);

    println!("\nProgress:");
    println!(
        "  Store: {} ({:?})",
        config.progress.path, config.progress.backend
    );
    println!("  Checkpoint every: {} records", config.progress.checkpoint_every);
    println!("  Mode: {}", if fresh { "fresh" } else { "resume" });

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main scrape operation
async fn handle_scrape(
    config: Config,
    config_hash: String,
    start_url: &str,
    fresh: bool,
    show_failed: bool,
) -> anyhow::Result<()> {
    let mut coordinator =
        Coordinator::new(&config, tracing::info_span!("scrape", site = %config.site.name))?
            .with_config_hash(config_hash);

    match open_progress_store(&config.progress) {
        Ok(store) => {
            tracing::info!("Checkpoints go to {}", store.describe());
            coordinator = coordinator.with_progress_store(store);
        }
        Err(e) => tracing::warn!("Progress store unavailable, running without checkpoints: {}", e),
    }

    let stop = coordinator.stop_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight requests");
            stop.stop();
        }
    });

    let records = if fresh {
        tracing::info!("Starting fresh run (ignoring previous progress)");
        coordinator.scrape_catalog(start_url).await
    } else {
        tracing::info!("Starting run (will resume from checkpoint if one exists)");
        coordinator.resume_catalog(start_url).await
    };

    let records_path = Path::new(&config.output.records_path);
    let mut sink = JsonLinesSink::create(records_path)
        .with_context(|| format!("cannot create {}", records_path.display()))?;
    let written = sink.write_records(records)?;
    tracing::info!("Wrote {} records to {}", written, records_path.display());

    let summary = coordinator.summary();
    let summary_path = Path::new(&config.output.summary_path);
    generate_markdown_summary(&summary, summary_path)
        .with_context(|| format!("cannot write {}", summary_path.display()))?;

    print_summary(&summary, show_failed);

    Ok(())
}
