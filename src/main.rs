//! Listing Harvester main entry point
//!
//! This is the command-line front door: it submits one batch, follows its
//! progress and prints the terminal result as JSON.

use anyhow::Context;
use clap::Parser;
use listing_harvester::config::{load_config_with_hash, Config};
use listing_harvester::input::{urls_from_file, urls_from_text};
use listing_harvester::{InputError, JobManager, JobStatus};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Listing Harvester: product listing extraction
///
/// Fetches each listing URL with paced, retrying requests, extracts title,
/// price, description, tags and photos, and writes one CSV row per listing.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version = "1.0.0")]
#[command(about = "Extracts product listings into a CSV file", long_about = None)]
struct Cli {
    /// Listing URLs to parse
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read URLs from a .txt or .csv file (one per line)
    #[arg(short, long, value_name = "URLS")]
    file: Option<PathBuf>,

    /// Progress poll interval in milliseconds
    #[arg(long, default_value_t = 500)]
    poll_ms: u64,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let urls = collect_urls(&cli)?;
    let manager = JobManager::from_config(&config)?;

    let accepted = manager.submit(urls).await?;
    tracing::info!("{}", accepted.message);

    let poll = Duration::from_millis(cli.poll_ms.max(1));
    let mut reported = None;
    loop {
        let state = manager.progress(accepted.job_id).await?;
        if reported != Some((state.current, state.status)) {
            if state.status == JobStatus::Processing {
                tracing::info!("Progress: {}/{}", state.current, state.total);
            }
            reported = Some((state.current, state.status));
        }
        if state.is_terminal() {
            break;
        }
        tokio::time::sleep(poll).await;
    }

    let envelope = manager.wait(accepted.job_id).await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    if envelope.success {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!(
            "Batch failed: {}",
            envelope.error().unwrap_or("unknown error")
        );
        Ok(ExitCode::FAILURE)
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Gathers positional URLs followed by the URLs of `--file`
fn collect_urls(cli: &Cli) -> Result<Vec<String>, InputError> {
    let mut urls = Vec::new();

    if !cli.urls.is_empty() {
        urls.extend(urls_from_text(&cli.urls.join("\n"))?);
    }
    if let Some(path) = &cli.file {
        urls.extend(urls_from_file(path)?);
    }

    if urls.is_empty() {
        return Err(InputError::NoUrls);
    }
    Ok(urls)
}
