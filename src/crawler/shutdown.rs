//! Single-fire shutdown coordination
//!
//! Three independent actors may decide that a crawl is over: the timer, the
//! signal listener and the engine itself once the link tree is exhausted. The
//! first one to call [`ShutdownCoordinator::request`] wins and is the only
//! caller that observes `true`; the transition is then broadcast to every actor
//! and worker through a cancellation token.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

/// What ended a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownTrigger {
    /// No task queued or pending anywhere
    Exhausted,

    /// The crawl timeout elapsed
    Timeout,

    /// SIGINT or SIGTERM was received
    Signal,

    /// The caller asked the crawl to stop, or dropped its results
    Interrupt,
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exhausted => "link tree exhausted",
            Self::Timeout => "timeout",
            Self::Signal => "signal",
            Self::Interrupt => "interrupt",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
struct Inner {
    trigger: Mutex<Option<ShutdownTrigger>>,
    token: CancellationToken,
}

/// Shared, cloneable shutdown switch for one crawl
#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    inner: Arc<Inner>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown on behalf of `trigger`
    ///
    /// Returns `true` for the single caller that moved the crawl from running
    /// to stopping; every later or concurrent caller gets `false` and must
    /// not act on it.
    pub fn request(&self, trigger: ShutdownTrigger) -> bool {
        {
            // Test-and-set only; nothing else happens under the lock
            let mut current = self
                .inner
                .trigger
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if current.is_some() {
                return false;
            }
            *current = Some(trigger);
        }

        tracing::info!("Initiating shutdown ({}).", trigger);
        self.inner.token.cancel();
        true
    }

    /// The trigger that won the race, if shutdown has begun
    pub fn trigger(&self) -> Option<ShutdownTrigger> {
        *self
            .inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_stopping(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Completes once shutdown has been requested
    pub async fn stopped(&self) {
        self.inner.token.cancelled().await
    }

    /// A token cancelled together with this coordinator, for workers
    pub fn token(&self) -> CancellationToken {
        self.inner.token.child_token()
    }
}
