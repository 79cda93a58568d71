use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Deadline of a single HTTP request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Number of fetch attempts per URL before it is marked as failed
    #[serde(rename = "max-retry")]
    pub max_retry: u32,

    /// Maximum number of in-flight fetch workers (0 means no cap)
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// Capacity of the queue carrying worker results back to the control loop
    #[serde(rename = "result-queue-capacity")]
    pub result_queue_capacity: usize,

    /// Capacity of the queue delivering page results to the caller
    #[serde(rename = "output-queue-capacity")]
    pub output_queue_capacity: usize,

    /// Interval of the outstanding-work check (milliseconds)
    #[serde(rename = "check-interval-ms")]
    pub check_interval_ms: u64,

    /// Whether to stop the crawl on SIGINT / SIGTERM
    ///
    /// Tokio keeps its signal handlers installed for the rest of the process,
    /// so once a crawl has listened for signals, SIGINT and SIGTERM no longer
    /// terminate the process by default. Embedders that rely on the default
    /// disposition should set this to `false` and call
    /// [`CrawlStream::interrupt`](crate::crawler::CrawlStream::interrupt) themselves.
    #[serde(rename = "handle-signals")]
    pub handle_signals: bool,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 4,
            max_retry: 3,
            max_workers: 0,
            result_queue_capacity: 100,
            output_queue_capacity: 100,
            check_interval_ms: 1000,
            handle_signals: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
