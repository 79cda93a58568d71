//! HTTP fetcher implementation
//!
//! This module performs the bounded-time GET of a single page and hands the
//! body to the link extractor. It knows nothing about the crawl scope: the
//! links it returns are unfiltered, which keeps it usable on its own.

use crate::config::Config;
use crate::crawler::parser::extract_links;
use crate::FetchError;
use reqwest::{header, Client};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with the configured user agent
///
/// # Example
///
/// ```
/// use hostcrawl::config::Config;
/// use hostcrawl::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .connect_timeout(config.crawler.request_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages and extracts their links
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher whose requests each have `timeout` as deadline
    ///
    /// A zero `timeout` means requests have no deadline.
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Builds a fetcher from the crawl configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            config.crawler.request_timeout(),
        ))
    }

    /// Fetches `url` and returns every link found on the page
    ///
    /// # Request Flow
    ///
    /// 1. GET the page, bounded by the per-request timeout
    /// 2. Any transport error or non-2xx status is returned as a `FetchError`
    /// 3. A response whose Content-Type is set and is not HTML yields no links
    /// 4. Otherwise the body is read and passed to the link extractor
    ///
    /// The response is owned by this call and released on every return path.
    pub async fn fetch(&self, url: &Url) -> Result<HashSet<Url>, FetchError> {
        let mut request = self.client.get(url.clone());
        if !self.timeout.is_zero() {
            request = request.timeout(self.timeout);
        }

        let response = request.send().await.map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let is_html = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |ct| ct.contains("html"));

        if !is_html {
            tracing::debug!("Skipping link extraction for non-HTML page {}", url);
            return Ok(HashSet::new());
        }

        // Resolve against the final URL so redirected pages keep correct relative links
        let origin = response.url().clone();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        Ok(extract_links(&origin, &body))
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
