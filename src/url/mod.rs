//! URL handling module for hostcrawl
//!
//! This module provides link canonicalization, seed validation and the
//! host-based crawl scope.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{parse_seed, sanitize};
pub use scope::CrawlScope;
