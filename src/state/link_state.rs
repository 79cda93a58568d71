//! Link state definitions for tracking crawl progress
//!
//! Every URL observed during a crawl is in exactly one of four states:
//!
//! ```text
//! unseen -> pending(0) -> pending(1) -> { visited | pending(n+1) | failed }
//! ```
//!
//! `LinkStates` is owned by the engine's control loop and is never shared with
//! workers, so none of its methods need locking.

use crate::CrawlError;
use std::collections::{HashMap, HashSet};
use std::fmt;
use url::Url;

/// Represents the current state of a link in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    /// Never scheduled
    Unseen,

    /// Scheduled on the task queue or assigned to a worker
    ///
    /// `attempts` counts the workers dispatched for this URL so far.
    Pending { attempts: u32 },

    /// Fetched successfully (terminal)
    Visited,

    /// Retry budget exhausted (terminal)
    Failed,
}

impl LinkState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Visited | Self::Failed)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unseen => write!(f, "unseen"),
            Self::Pending { attempts } => write!(f, "pending({})", attempts),
            Self::Visited => write!(f, "visited"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// What the engine should do after a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Put the URL back on the task queue
    Retry { attempts: u32 },

    /// The URL has been moved to the failed set
    GiveUp { attempts: u32 },
}

/// The visited / pending / failed partition of a crawl
#[derive(Debug, Clone)]
pub struct LinkStates {
    visited: HashSet<Url>,
    pending: HashMap<Url, u32>,
    failed: HashSet<Url>,
    max_retry: u32,
}

impl LinkStates {
    /// Creates an empty partition; `max_retry` is the number of attempts per URL
    pub fn new(max_retry: u32) -> Self {
        Self {
            visited: HashSet::new(),
            pending: HashMap::new(),
            failed: HashSet::new(),
            max_retry: max_retry.max(1),
        }
    }

    /// Returns the current state of a URL
    pub fn state_of(&self, url: &Url) -> LinkState {
        if self.visited.contains(url) {
            LinkState::Visited
        } else if let Some(&attempts) = self.pending.get(url) {
            LinkState::Pending { attempts }
        } else if self.failed.contains(url) {
            LinkState::Failed
        } else {
            LinkState::Unseen
        }
    }

    /// Returns true if the URL was ever scheduled
    ///
    /// Failed URLs count as seen so a dead page linked from many places is not
    /// retried from every referrer.
    pub fn is_seen(&self, url: &Url) -> bool {
        self.visited.contains(url) || self.pending.contains_key(url) || self.failed.contains(url)
    }

    /// Keeps only the links that were never scheduled
    pub fn retain_unseen<I>(&self, links: I) -> Vec<Url>
    where
        I: IntoIterator<Item = Url>,
    {
        links.into_iter().filter(|link| !self.is_seen(link)).collect()
    }

    /// `unseen -> pending(0)`; returns false if the URL was already seen
    pub fn schedule(&mut self, url: &Url) -> bool {
        if self.is_seen(url) {
            return false;
        }
        self.pending.insert(url.clone(), 0);
        true
    }

    /// Records a worker dispatch and returns the attempt number
    pub fn mark_dispatched(&mut self, url: &Url) -> Result<u32, CrawlError> {
        match self.pending.get_mut(url) {
            Some(attempts) => {
                *attempts += 1;
                Ok(*attempts)
            }
            None => Err(self.invalid(url, LinkState::Pending { attempts: 1 })),
        }
    }

    /// `pending -> visited`
    pub fn record_success(&mut self, url: &Url) -> Result<(), CrawlError> {
        if self.pending.remove(url).is_none() {
            return Err(self.invalid(url, LinkState::Visited));
        }
        self.visited.insert(url.clone());
        Ok(())
    }

    /// `pending -> pending` while attempts remain, `pending -> failed` otherwise
    pub fn record_failure(&mut self, url: &Url) -> Result<RetryDecision, CrawlError> {
        let attempts = match self.pending.get(url) {
            Some(&attempts) => attempts,
            None => return Err(self.invalid(url, LinkState::Failed)),
        };

        if attempts < self.max_retry {
            return Ok(RetryDecision::Retry { attempts });
        }

        self.pending.remove(url);
        self.failed.insert(url.clone());
        Ok(RetryDecision::GiveUp { attempts })
    }

    /// Returns true while some URL is scheduled or in flight
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn max_retry(&self) -> u32 {
        self.max_retry
    }

    fn invalid(&self, url: &Url, to: LinkState) -> CrawlError {
        CrawlError::InvalidTransition {
            url: url.to_string(),
            from: self.state_of(url),
            to,
        }
    }
}
