//! HTML link extraction
//!
//! Turns a page body into the de-duplicated set of canonical anchor targets.
//! Only `<a href="...">` elements are considered; each href goes through
//! [`sanitize`](crate::url::sanitize). Links that fail to resolve are logged
//! and dropped without affecting the rest of the page.

use crate::url::sanitize;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts all canonical anchor links from an HTML document
///
/// Links are resolved against `origin`, stripped of query and fragment, and
/// collected into a set, so duplicates collapse and input order is irrelevant.
/// No host filtering happens here.
///
/// # Example
///
/// ```
/// use hostcrawl::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/page?x=1">One</a><a href="/page#top">Two</a>"#;
/// let origin = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(&origin, html);
/// assert_eq!(links.len(), 1);
/// ```
pub fn extract_links(origin: &Url, html: &str) -> HashSet<Url> {
    let document = Html::parse_document(html);
    let mut links = HashSet::new();

    let anchors = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Failed to build anchor selector: {:?}", e);
            return links;
        }
    };

    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        match sanitize(origin, href) {
            Ok(Some(link)) => {
                links.insert(link);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::trace!(url = %origin, href, "Error in parsing anchor: {}", e);
            }
        }
    }

    links
}
