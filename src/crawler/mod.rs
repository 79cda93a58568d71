//! Crawler module for single-host crawling
//!
//! This module contains the core crawling logic, including:
//! - HTML parsing and link extraction
//! - Bounded-time HTTP fetching
//! - The crawl engine (control loop, workers, retry policy)
//! - Shutdown coordination between the engine, a timer and signals

mod control;
mod engine;
mod fetcher;
mod parser;
mod shutdown;

pub use control::{validate_input, CrawlStream, Crawler};
pub use engine::{CrawlSummary, PageResult};
pub use fetcher::{build_http_client, Fetcher};
pub use parser::extract_links;
pub use shutdown::{ShutdownCoordinator, ShutdownTrigger};

use crate::config::Config;
use crate::url::parse_seed;
use crate::CrawlError;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Starts a crawl with the default configuration and returns its result stream
///
/// Invalid input (empty URL, malformed URL, negative timeout) is reported
/// immediately and nothing is started. A zero timeout means no timeout.
///
/// The crawl listens for SIGINT / SIGTERM, which replaces the default signal
/// disposition for the rest of the process. Use [`Crawler`] with
/// `handle_signals = false` to keep it.
///
/// # Example
///
/// ```no_run
/// use hostcrawl::crawler::stream_links;
///
/// # async fn example() -> hostcrawl::Result<()> {
/// let mut stream = stream_links("https://example.com/", chrono::Duration::zero())?;
/// while let Some(page) = stream.recv().await {
///     println!("Found {} unvisited links on page {}", page.links.len(), page.url);
/// }
/// # Ok(())
/// # }
/// ```
pub fn stream_links(seed: &str, timeout: chrono::Duration) -> Result<CrawlStream, CrawlError> {
    validate_input(seed, timeout)?;
    Crawler::new(Config::default())?.stream(seed, timeout)
}

/// Crawls with the default configuration and returns every discovered link
///
/// Blocks until the link tree is exhausted, the timeout elapses, or the
/// process is interrupted. Signal handling behaves as in [`stream_links`].
pub async fn fetch_links(seed: &str, timeout: chrono::Duration) -> Result<Vec<Url>, CrawlError> {
    validate_input(seed, timeout)?;
    Crawler::new(Config::default())?.fetch(seed, timeout).await
}

/// Returns the links found on a single page, without any host filtering
///
/// A zero `timeout` means the request has no deadline.
pub async fn scrape_links(url: &str, timeout: Duration) -> Result<HashSet<Url>, CrawlError> {
    let url = parse_seed(url)?;
    let fetcher = Fetcher::new(build_http_client(&Config::default())?, timeout);
    Ok(fetcher.fetch(&url).await?)
}
