//! Crawl control - input validation, the timer and signal actors, and the
//! supervisor that joins them with the engine
//!
//! A crawl runs three long-lived actors sharing one [`ShutdownCoordinator`]:
//! the engine's control loop, a timer and an OS signal listener. The
//! supervisor waits for all three before it returns, and the output queue
//! closes once the engine (its only sender) is gone.

use crate::config::Config;
use crate::crawler::engine::{CrawlSummary, Engine, PageResult};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::shutdown::{ShutdownCoordinator, ShutdownTrigger};
use crate::url::{parse_seed, CrawlScope};
use crate::CrawlError;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

/// A configured crawler, reusable for several crawls
///
/// # Example
///
/// ```no_run
/// use hostcrawl::config::Config;
/// use hostcrawl::crawler::Crawler;
///
/// # async fn example() -> hostcrawl::Result<()> {
/// let crawler = Crawler::new(Config::default())?;
/// let mut stream = crawler.stream("https://example.com/", chrono::Duration::seconds(30))?;
/// while let Some(page) = stream.recv().await {
///     println!("{}: {} new links", page.url, page.links.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Crawler {
    config: Config,
    fetcher: Fetcher,
}

impl Crawler {
    /// Validates the configuration and builds the HTTP client
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        crate::config::validate(&config)?;
        let fetcher = Fetcher::from_config(&config)?;
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Starts a crawl in the background and returns its result stream
    ///
    /// The input is validated before anything is spawned. A zero timeout means
    /// the crawl runs until the link tree is exhausted or a signal arrives.
    /// Must be called from within a Tokio runtime.
    pub fn stream(&self, seed: &str, timeout: chrono::Duration) -> Result<CrawlStream, CrawlError> {
        let (scope, timeout) = validate_input(seed, timeout)?;

        let shutdown = ShutdownCoordinator::new();
        let (output_tx, output_rx) =
            mpsc::channel(self.config.crawler.output_queue_capacity.max(1));

        let engine = Engine::new(
            scope,
            self.fetcher.clone(),
            &self.config.crawler,
            shutdown.clone(),
            output_tx,
        );

        let supervisor = tokio::spawn(supervise(
            engine,
            timeout,
            self.config.crawler.handle_signals,
            shutdown.clone(),
        ));

        Ok(CrawlStream {
            results: output_rx,
            shutdown,
            supervisor,
        })
    }

    /// Crawls until a stop condition and returns every discovered link
    pub async fn fetch(&self, seed: &str, timeout: chrono::Duration) -> Result<Vec<Url>, CrawlError> {
        let mut stream = self.stream(seed, timeout)?;
        let mut links = Vec::new();

        while let Some(result) = stream.recv().await {
            links.extend(result.links);
        }

        Ok(links)
    }
}

/// Handle on a running crawl
///
/// Yields one [`PageResult`] per successfully visited page. The stream ends
/// when the crawl terminates, whatever the reason.
#[derive(Debug)]
pub struct CrawlStream {
    results: mpsc::Receiver<PageResult>,
    shutdown: ShutdownCoordinator,
    supervisor: JoinHandle<Option<CrawlSummary>>,
}

impl CrawlStream {
    /// Receives the next page result, or `None` once the crawl has ended
    pub async fn recv(&mut self) -> Option<PageResult> {
        self.results.recv().await
    }

    /// Asks the crawl to stop, as an OS signal would
    ///
    /// Returns `true` if this call initiated the shutdown.
    pub fn interrupt(&self) -> bool {
        self.shutdown.request(ShutdownTrigger::Interrupt)
    }

    /// The crawl's shutdown coordinator
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Drains the remaining results and waits for the crawl to finish
    ///
    /// Returns `None` if the engine panicked.
    pub async fn wait(mut self) -> Option<CrawlSummary> {
        while self.results.recv().await.is_some() {}

        match self.supervisor.await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Crawl supervisor failed: {}", e);
                None
            }
        }
    }

    /// Gives up the control handle and keeps only the result queue
    pub fn into_inner(self) -> mpsc::Receiver<PageResult> {
        self.results
    }
}

/// Checks a crawl request before any concurrency starts
///
/// Returns the crawl scope and the crawl deadline (`None` for no timeout).
pub fn validate_input(
    seed: &str,
    timeout: chrono::Duration,
) -> Result<(CrawlScope, Option<Duration>), CrawlError> {
    if seed.trim().is_empty() {
        return Err(CrawlError::EmptyUrl);
    }

    let url = parse_seed(seed).map_err(|e| CrawlError::InvalidUrl {
        url: seed.to_string(),
        reason: e.to_string(),
    })?;

    let timeout = timeout
        .to_std()
        .map_err(|_| CrawlError::NegativeTimeout(timeout))?;

    Ok((CrawlScope::new(url)?, (!timeout.is_zero()).then_some(timeout)))
}

/// Runs the engine, the timer and the signal listener, and joins all three
async fn supervise(
    engine: Engine,
    timeout: Option<Duration>,
    handle_signals: bool,
    shutdown: ShutdownCoordinator,
) -> Option<CrawlSummary> {
    let engine = async {
        let joined = tokio::spawn(engine.run()).await;
        if joined.is_err() {
            // Release the timer and signal listener so the join below completes
            shutdown.request(ShutdownTrigger::Interrupt);
        }
        joined
    };
    let timer = tokio::spawn(run_timer(timeout, shutdown.clone()));
    let signals = tokio::spawn(listen_for_signals(handle_signals, shutdown.clone()));

    let (engine, timer, signals) = tokio::join!(engine, timer, signals);

    for (actor, joined) in [("timer", timer), ("signal listener", signals)] {
        if let Err(e) = joined {
            tracing::error!("The {} failed: {}", actor, e);
        }
    }

    match engine {
        Ok(summary) => {
            tracing::info!(
                "Crawler shutting down ({}).",
                summary
                    .trigger
                    .map_or_else(|| "unknown".to_string(), |t| t.to_string())
            );
            Some(summary)
        }
        Err(e) => {
            tracing::error!("Crawl engine failed: {}", e);
            None
        }
    }
}

/// Requests shutdown once `timeout` elapses, unless the crawl stops first
async fn run_timer(timeout: Option<Duration>, shutdown: ShutdownCoordinator) {
    let Some(timeout) = timeout else {
        tracing::info!("No value assigned for timeout. Timer will not run.");
        return;
    };

    tokio::select! {
        _ = shutdown.stopped() => {
            tracing::trace!("Timer received stop message. Stopping timer.");
        }
        _ = tokio::time::sleep(timeout) => {
            tracing::info!("Timing out after {:?}.", timeout);
            shutdown.request(ShutdownTrigger::Timeout);
        }
    }
}

/// Requests shutdown on SIGINT / SIGTERM, unless the crawl stops first
///
/// When disabled, no signal handler is registered at all.
async fn listen_for_signals(enabled: bool, shutdown: ShutdownCoordinator) {
    if !enabled {
        return;
    }

    tokio::select! {
        _ = shutdown.stopped() => {
            tracing::trace!("Signal listener received stop message.");
        }
        received = wait_for_signal() => match received {
            Ok(name) => {
                tracing::info!("Received {}, stopping.", name);
                shutdown.request(ShutdownTrigger::Signal);
            }
            Err(e) => {
                tracing::warn!("Failed to listen for signals: {}", e);
            }
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        interrupted = tokio::signal::ctrl_c() => interrupted.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}
