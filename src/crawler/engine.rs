//! Crawl engine - the control loop and its fetch workers
//!
//! The control loop is the only owner of the link states and the task queue.
//! Each iteration it reacts to whichever source is ready first:
//! - a shutdown notification
//! - a worker result
//! - a task to dispatch (when a worker slot is free)
//! - the periodic outstanding-work check
//!
//! Workers run one fetch each and report back on the bounded result queue.
//! They never touch crawl state, and they drop their result instead of
//! publishing it once shutdown has begun.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::shutdown::{ShutdownCoordinator, ShutdownTrigger};
use crate::state::{LinkStates, RetryDecision};
use crate::url::CrawlScope;
use crate::FetchError;
use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use url::Url;

/// One successfully visited page
///
/// `links` holds the in-scope links found on the page that had not been seen
/// before, sorted, without query strings or fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub url: Url,
    pub links: Vec<Url>,
}

/// Totals of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub seed: Url,
    pub visited: usize,
    pub failed: usize,
    /// Links still scheduled or in flight when the crawl stopped
    pub pending: usize,
    pub trigger: Option<ShutdownTrigger>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Outcome of one fetch attempt, sent from a worker to the control loop
#[derive(Debug)]
struct FetchOutcome {
    url: Url,
    links: Result<HashSet<Url>, FetchError>,
}

/// Per-crawl engine state
pub(crate) struct Engine {
    scope: CrawlScope,
    fetcher: Fetcher,
    states: LinkStates,
    tasks: VecDeque<Url>,
    results_tx: mpsc::Sender<FetchOutcome>,
    results_rx: mpsc::Receiver<FetchOutcome>,
    output: mpsc::Sender<PageResult>,
    shutdown: ShutdownCoordinator,
    workers: TaskTracker,
    slots: Arc<Semaphore>,
    check_interval: Duration,
}

impl Engine {
    pub(crate) fn new(
        scope: CrawlScope,
        fetcher: Fetcher,
        config: &CrawlerConfig,
        shutdown: ShutdownCoordinator,
        output: mpsc::Sender<PageResult>,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::channel(config.result_queue_capacity.max(1));
        let slots = match config.max_workers {
            0 => Semaphore::MAX_PERMITS,
            n => n.min(Semaphore::MAX_PERMITS),
        };

        Self {
            scope,
            fetcher,
            states: LinkStates::new(config.max_retry),
            tasks: VecDeque::new(),
            results_tx,
            results_rx,
            output,
            shutdown,
            workers: TaskTracker::new(),
            slots: Arc::new(Semaphore::new(slots)),
            check_interval: config.check_interval().max(Duration::from_millis(10)),
        }
    }

    /// Runs the control loop until shutdown, then joins every worker
    pub(crate) async fn run(mut self) -> CrawlSummary {
        let started_at = Utc::now();
        let start = Instant::now();

        let seed = self.scope.seed().clone();
        tracing::info!("Starting crawl of {} (scope: {})", seed, self.scope.host());
        self.enqueue(seed);

        let mut ticker = tokio::time::interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.stopped() => break,

                Some(outcome) = self.results_rx.recv() => {
                    self.handle_outcome(outcome).await;
                }

                permit = self.slots.clone().acquire_owned(), if !self.tasks.is_empty() => {
                    match permit {
                        Ok(permit) => self.dispatch(permit),
                        Err(_) => break,
                    }
                }

                _ = ticker.tick() => {
                    if !self.has_outstanding_work() {
                        self.shutdown.request(ShutdownTrigger::Exhausted);
                    }
                }
            }
        }

        self.stop(started_at, start).await
    }

    fn has_outstanding_work(&self) -> bool {
        !self.tasks.is_empty() || self.states.has_pending()
    }

    /// Schedules a link that was never seen before
    fn enqueue(&mut self, url: Url) {
        if self.states.schedule(&url) {
            self.tasks.push_back(url);
        }
    }

    /// Takes the next task off the queue and spawns a worker for it
    fn dispatch(&mut self, permit: OwnedSemaphorePermit) {
        let Some(url) = self.tasks.pop_front() else {
            return;
        };

        let attempt = match self.states.mark_dispatched(&url) {
            Ok(attempt) => attempt,
            Err(e) => {
                tracing::warn!("Not dispatching {}: {}", url, e);
                return;
            }
        };

        tracing::debug!("Dispatching worker for {} (attempt {})", url, attempt);
        self.workers.spawn(run_worker(
            self.fetcher.clone(),
            url,
            self.results_tx.clone(),
            self.shutdown.token(),
            permit,
        ));
    }

    /// Applies a worker result to the link states
    async fn handle_outcome(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { url, links } = outcome;

        match links {
            Ok(links) => {
                if let Err(e) = self.states.record_success(&url) {
                    tracing::warn!("Ignoring result for {}: {}", url, e);
                    return;
                }

                let in_scope = self.scope.retain(links);
                let mut fresh = self.states.retain_unseen(in_scope);
                fresh.sort();

                for link in &fresh {
                    self.enqueue(link.clone());
                }

                tracing::debug!("Found {} unvisited links on page {}", fresh.len(), url);
                self.publish(PageResult { url, links: fresh }).await;
            }
            Err(error) => match self.states.record_failure(&url) {
                Ok(RetryDecision::Retry { attempts }) => {
                    tracing::debug!(
                        "Retrying {} after attempt {}/{}: {}",
                        url,
                        attempts,
                        self.states.max_retry(),
                        error
                    );
                    self.tasks.push_back(url);
                }
                Ok(RetryDecision::GiveUp { attempts }) => {
                    tracing::warn!("Giving up on {} after {} attempts: {}", url, attempts, error);
                }
                Err(e) => tracing::warn!("Ignoring failure for {}: {}", url, e),
            },
        }
    }

    /// Delivers a page result to the caller unless shutdown begins first
    async fn publish(&self, result: PageResult) {
        let url = result.url.clone();

        tokio::select! {
            biased;

            _ = self.shutdown.stopped() => {
                tracing::trace!("Dropping result for {}, crawl is stopping", url);
            }

            sent = self.output.send(result) => {
                if sent.is_err() {
                    tracing::debug!("Result receiver dropped, stopping crawl");
                    self.shutdown.request(ShutdownTrigger::Interrupt);
                }
            }
        }
    }

    /// Waits for all workers, then reports totals
    async fn stop(self, started_at: DateTime<Utc>, start: Instant) -> CrawlSummary {
        tracing::info!("Stopping crawler.");

        // Workers observe the cancellation, including those blocked on a full result queue
        self.workers.close();
        self.workers.wait().await;

        let summary = CrawlSummary {
            seed: self.scope.seed().clone(),
            visited: self.states.visited_count(),
            failed: self.states.failed_count(),
            pending: self.states.pending_count(),
            trigger: self.shutdown.trigger(),
            started_at,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Crawler visited a total of {} links starting from {} ({} failed, {} pending) in {:?}",
            summary.visited,
            summary.seed,
            summary.failed,
            summary.pending,
            summary.elapsed
        );

        summary
    }
}

/// Fetches one page and reports the outcome, unless cancelled first
async fn run_worker(
    fetcher: Fetcher,
    url: Url,
    results: mpsc::Sender<FetchOutcome>,
    cancel: CancellationToken,
    _permit: OwnedSemaphorePermit,
) {
    let links = tokio::select! {
        _ = cancel.cancelled() => {
            tracing::trace!("Worker for {} cancelled mid-request", url);
            return;
        }
        links = fetcher.fetch(&url) => links,
    };

    if let Err(e) = &links {
        tracing::warn!("Encountered error on page '{}': {}", url, e);
    }

    let outcome = FetchOutcome {
        url: url.clone(),
        links,
    };

    // Once shutdown begins the outcome is dropped
    tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            tracing::trace!("Discarding result for {}, crawl is stopping", url);
        }

        _ = results.send(outcome) => {}
    }
}
