//! Crawl report rendering
//!
//! Accumulates page results as they stream in and prints them, followed by a
//! closing summary once the crawl has ended.

use crate::crawler::{CrawlSummary, PageResult};
use std::fmt::Write as _;

/// Running totals of the results seen by the caller
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Number of page results received
    pub pages: usize,

    /// Number of links reported across all results
    pub links: usize,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page result to the totals
    pub fn record(&mut self, result: &PageResult) {
        self.pages += 1;
        self.links += result.links.len();
    }

    /// Prints a page result and adds it to the totals
    pub fn print_result(&mut self, result: &PageResult) {
        println!("{}", format_result(result));
        self.record(result);
    }

    /// Prints the closing report
    pub fn print_summary(&self, summary: Option<&CrawlSummary>) {
        println!("{}", format_summary(self, summary));
    }
}

/// Formats one page result on a single line
///
/// # Example
///
/// ```
/// use hostcrawl::crawler::PageResult;
/// use hostcrawl::output::format_result;
/// use url::Url;
///
/// let result = PageResult {
///     url: Url::parse("https://x.test/").unwrap(),
///     links: vec![Url::parse("https://x.test/a").unwrap()],
/// };
/// assert_eq!(
///     format_result(&result),
///     "Found 1 unvisited links on page https://x.test/ : [https://x.test/a]"
/// );
/// ```
pub fn format_result(result: &PageResult) -> String {
    let links: Vec<&str> = result.links.iter().map(|l| l.as_str()).collect();
    format!(
        "Found {} unvisited links on page {} : [{}]",
        result.links.len(),
        result.url,
        links.join(", ")
    )
}

/// Formats the closing report
pub fn format_summary(report: &CrawlReport, summary: Option<&CrawlSummary>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Crawl Summary ===");
    let _ = writeln!(out, "  Pages received: {}", report.pages);
    let _ = writeln!(out, "  Links discovered: {}", report.links);

    if let Some(summary) = summary {
        let _ = writeln!(out, "  Seed: {}", summary.seed);
        let _ = writeln!(
            out,
            "  Started: {}",
            summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(out, "  Duration: {:.1}s", summary.elapsed.as_secs_f64());
        let _ = writeln!(out, "  Visited: {}", summary.visited);
        let _ = writeln!(out, "  Failed: {}", summary.failed);
        if summary.pending > 0 {
            let _ = writeln!(out, "  Not reached: {}", summary.pending);
        }
        if let Some(trigger) = summary.trigger {
            let _ = writeln!(out, "  Stopped by: {}", trigger);
        }
    }

    out.trim_end().to_string()
}
