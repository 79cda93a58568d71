//! Output module for rendering crawl results
//!
//! This module handles printing page results as they arrive and the closing
//! summary of a crawl.

mod report;

pub use report::{format_result, format_summary, CrawlReport};
