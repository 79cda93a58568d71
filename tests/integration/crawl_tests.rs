//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use hostcrawl::config::{Config, CrawlerConfig, UserAgentConfig};
use hostcrawl::crawler::{
    fetch_links, scrape_links, stream_links, CrawlStream, Crawler, PageResult, ShutdownTrigger,
};
use hostcrawl::CrawlError;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a short exhaustion check and no signal handling
fn create_test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            request_timeout_secs: 30,
            max_retry: 3,
            max_workers: 4,
            check_interval_ms: 50,
            handle_signals: false,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Mounts a small site: `/` -> `/a`, `/b`; `/a` -> `/b`, `/c`; `/b` -> `/a`; `/c` -> nothing
async fn mount_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#,
    )
    .await;
    mount_page(
        server,
        "/a",
        r#"<html><body><a href="/b">B</a><a href="c">C</a><a href="/">Home</a></body></html>"#,
    )
    .await;
    mount_page(
        server,
        "/b",
        r#"<html><body><a href="/a#top">A</a></body></html>"#,
    )
    .await;
    mount_page(server, "/c", "<html><body>leaf</body></html>").await;
}

/// Collects every result until the stream closes, failing the test if it takes too long
async fn collect(stream: &mut CrawlStream, limit: Duration) -> Vec<PageResult> {
    tokio::time::timeout(limit, async {
        let mut results = Vec::new();
        while let Some(result) = stream.recv().await {
            results.push(result);
        }
        results
    })
    .await
    .expect("crawl did not terminate in time")
}

#[tokio::test]
async fn test_crawl_exhausts_link_tree() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let mut stream = crawler
        .stream(&server.uri(), chrono::Duration::zero())
        .unwrap();

    let results = collect(&mut stream, Duration::from_secs(10)).await;

    // One result per page, each page visited exactly once
    let pages: HashSet<String> = results.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(results.len(), 4);
    assert_eq!(
        pages,
        ["/", "/a", "/b", "/c"].iter().map(|p| p.to_string()).collect()
    );

    // Every non-seed page is reported as a new link exactly once
    let links: Vec<String> = results
        .iter()
        .flat_map(|r| r.links.iter().map(|l| l.path().to_string()))
        .collect();
    let unique: HashSet<&String> = links.iter().collect();
    assert_eq!(links.len(), 3);
    assert_eq!(unique.len(), 3);

    let summary = stream.wait().await.expect("engine summary");
    assert_eq!(summary.visited, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.pending, 0);
    assert_eq!(summary.trigger, Some(ShutdownTrigger::Exhausted));
}

#[tokio::test]
async fn test_crawl_stays_on_seed_host() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("<html><body>external</body></html>"))
        .expect(0)
        .mount(&external)
        .await;

    let home = format!(
        r#"<html><body>
            <a href="/local">Local</a>
            <a href="{}/away">Away</a>
            <a href="mailto:someone@example.com">Mail</a>
        </body></html>"#,
        external.uri()
    );
    mount_page(&server, "/", &home).await;
    mount_page(&server, "/local", "<html><body>done</body></html>").await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let mut stream = crawler
        .stream(&server.uri(), chrono::Duration::zero())
        .unwrap();

    let results = collect(&mut stream, Duration::from_secs(10)).await;
    assert_eq!(results.len(), 2);

    let seed = &results[0];
    assert_eq!(seed.url.path(), "/");
    assert_eq!(seed.links.len(), 1);
    assert_eq!(seed.links[0].path(), "/local");

    stream.wait().await;
    external.verify().await;
}

#[tokio::test]
async fn test_failing_page_is_retried_up_to_cap() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/broken">Broken</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let mut stream = crawler
        .stream(&server.uri(), chrono::Duration::zero())
        .unwrap();

    let results = collect(&mut stream, Duration::from_secs(10)).await;
    assert_eq!(results.len(), 1);
    assert!(results.iter().all(|r| r.url.path() != "/broken"));

    let summary = stream.wait().await.expect("engine summary");
    assert_eq!(summary.visited, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.trigger, Some(ShutdownTrigger::Exhausted));

    server.verify().await;
}

#[tokio::test]
async fn test_timeout_stops_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/slow">Slow</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<html></html>").set_delay(Duration::from_secs(20)))
        .mount(&server)
        .await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let started = std::time::Instant::now();
    let mut stream = crawler
        .stream(&server.uri(), chrono::Duration::seconds(1))
        .unwrap();

    let results = collect(&mut stream, Duration::from_secs(5)).await;
    assert_eq!(results.len(), 1);
    assert!(started.elapsed() >= Duration::from_secs(1));

    let summary = stream.wait().await.expect("engine summary");
    assert_eq!(summary.trigger, Some(ShutdownTrigger::Timeout));
    assert_eq!(summary.pending, 1);
}

#[tokio::test]
async fn test_interrupt_stops_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/slow">Slow</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<html></html>").set_delay(Duration::from_secs(20)))
        .mount(&server)
        .await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let mut stream = crawler
        .stream(&server.uri(), chrono::Duration::zero())
        .unwrap();

    let first = stream.recv().await.expect("seed result");
    assert_eq!(first.url.path(), "/");

    assert!(stream.interrupt());
    assert!(!stream.interrupt());

    let rest = collect(&mut stream, Duration::from_secs(5)).await;
    assert!(rest.is_empty());

    let summary = stream.wait().await.expect("engine summary");
    assert_eq!(summary.trigger, Some(ShutdownTrigger::Interrupt));
}

#[tokio::test]
async fn test_interrupt_racing_timeout_closes_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/slow">Slow</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<html></html>").set_delay(Duration::from_secs(20)))
        .mount(&server)
        .await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let mut stream = crawler
        .stream(&server.uri(), chrono::Duration::seconds(1))
        .unwrap();

    let shutdown = stream.shutdown().clone();
    let interrupter = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        shutdown.request(ShutdownTrigger::Interrupt)
    });

    collect(&mut stream, Duration::from_secs(5)).await;
    let summary = stream.wait().await.expect("engine summary");
    let interrupted = interrupter.await.unwrap();

    match summary.trigger {
        Some(ShutdownTrigger::Interrupt) => assert!(interrupted),
        Some(ShutdownTrigger::Timeout) => assert!(!interrupted),
        other => panic!("unexpected trigger {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_links_returns_all_discovered_links() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let links = tokio::time::timeout(
        Duration::from_secs(15),
        fetch_links(&server.uri(), chrono::Duration::zero()),
    )
    .await
    .expect("crawl did not terminate in time")
    .unwrap();

    let paths: HashSet<String> = links.iter().map(|l| l.path().to_string()).collect();
    assert_eq!(links.len(), 3);
    assert_eq!(
        paths,
        ["/a", "/b", "/c"].iter().map(|p| p.to_string()).collect()
    );
}

#[tokio::test]
async fn test_stream_links_rejects_invalid_input() {
    assert!(matches!(
        stream_links("", chrono::Duration::zero()),
        Err(CrawlError::EmptyUrl)
    ));
    assert!(matches!(
        stream_links("bytema.re", chrono::Duration::zero()),
        Err(CrawlError::InvalidUrl { .. })
    ));
    assert!(matches!(
        stream_links("https://bytema.re", chrono::Duration::seconds(-10)),
        Err(CrawlError::NegativeTimeout(_))
    ));
}

#[tokio::test]
async fn test_fetch_links_rejects_invalid_input() {
    assert!(matches!(
        fetch_links("", chrono::Duration::zero()).await,
        Err(CrawlError::EmptyUrl)
    ));
    assert!(matches!(
        fetch_links("bytema.re", chrono::Duration::zero()).await,
        Err(CrawlError::InvalidUrl { .. })
    ));
    assert!(matches!(
        fetch_links("https://bytema.re", chrono::Duration::seconds(-10)).await,
        Err(CrawlError::NegativeTimeout(_))
    ));
}

#[tokio::test]
async fn test_scrape_links_single_page() {
    let server = MockServer::start().await;
    let external = "https://elsewhere.test/page";

    let body = format!(
        r##"<html><body><a href="/a?x=1">A</a><a href="{}">E</a><a href="#top">Top</a></body></html>"##,
        external
    );
    mount_page(&server, "/", &body).await;

    let links = scrape_links(&server.uri(), Duration::from_secs(5))
        .await
        .unwrap();

    let base = Url::parse(&server.uri()).unwrap();
    let expected: HashSet<Url> = [base.join("/a").unwrap(), Url::parse(external).unwrap()]
        .into_iter()
        .collect();
    assert_eq!(links, expected);
}

#[tokio::test]
async fn test_scrape_links_without_timeout() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<html><body><a href="/a">A</a></body></html>"#).await;

    let links = scrape_links(&server.uri(), Duration::ZERO).await.unwrap();

    let base = Url::parse(&server.uri()).unwrap();
    assert_eq!(links, HashSet::from([base.join("/a").unwrap()]));
}
