//! Hostcrawl main entry point
//!
//! This is the command-line interface for the hostcrawl single-host crawler.

use anyhow::Context;
use clap::Parser;
use hostcrawl::config::{load_config, Config};
use hostcrawl::crawler::Crawler;
use hostcrawl::output::CrawlReport;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Hostcrawl: a single-host web crawler
///
/// Crawls every page reachable from URL within the same host and prints the
/// links found on each page. Stops when no page is left to visit, when the
/// timeout elapses, or on Ctrl+C.
#[derive(Parser, Debug)]
#[command(name = "hostcrawl")]
#[command(version)]
#[command(about = "A single-host web crawler", long_about = None)]
struct Cli {
    /// Entry point of the crawl, e.g. https://bytema.re
    #[arg(value_name = "URL")]
    url: String,

    /// Crawling time in seconds; 0 means no timeout
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    timeout: i64,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let crawler = Crawler::new(config)?;
    let mut stream = crawler.stream(&cli.url, crawl_timeout(cli.timeout)?)?;

    tracing::info!("Starting web crawler. You can interrupt the program any time with ctrl+c.");

    let mut report = CrawlReport::new();
    while let Some(result) = stream.recv().await {
        report.print_result(&result);
    }

    let summary = stream.wait().await;
    report.print_summary(summary.as_ref());

    Ok(())
}

/// Converts the `--timeout` seconds into a crawl timeout
fn crawl_timeout(secs: i64) -> anyhow::Result<chrono::Duration> {
    chrono::Duration::try_seconds(secs)
        .ok_or_else(|| anyhow::anyhow!("timeout of {} seconds is out of range", secs))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hostcrawl=info,warn"),
            1 => EnvFilter::new("hostcrawl=debug,info"),
            2 => EnvFilter::new("hostcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}
