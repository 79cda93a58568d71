//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `LinkState`: The state of an individual link (unseen, pending, visited, failed)
//! - `LinkStates`: The per-crawl partition of links and its transitions
//! - `RetryDecision`: What to do with a link whose fetch failed

mod link_state;

// Re-export main types
pub use link_state::{LinkState, LinkStates, RetryDecision};
