use crate::UrlError;
use url::Url;

/// Rewrites an `href` found on `origin` into a canonical absolute link
///
/// # Canonicalization Steps
///
/// 1. Skip empty, fragment-only (`#top`) and query-only (`?page=2`) hrefs
/// 2. Resolve the href against the origin page (standard relative resolution)
/// 3. Skip anything that is not HTTP(S) after resolution (`mailto:`, `javascript:`)
/// 4. Strip the query string and the fragment
/// 5. Skip links whose path is empty or the root `/`
///
/// Stripping queries and fragments keeps query variants and in-page anchors of
/// the same document from being visited over and over.
///
/// # Returns
///
/// * `Ok(Some(Url))` - The canonical link
/// * `Ok(None)` - The href is valid but not worth following
/// * `Err(UrlError)` - The href could not be resolved
///
/// # Examples
///
/// ```
/// use url::Url;
/// use hostcrawl::url::sanitize;
///
/// let origin = Url::parse("https://x.test/a").unwrap();
/// let link = sanitize(&origin, "/b?x=1#y").unwrap().unwrap();
/// assert_eq!(link.as_str(), "https://x.test/b");
/// ```
pub fn sanitize(origin: &Url, href: &str) -> Result<Option<Url>, UrlError> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') || href.starts_with('?') {
        return Ok(None);
    }

    let mut link = origin
        .join(href)
        .map_err(|e| UrlError::Parse(format!("couldn't resolve '{}': {}", href, e)))?;

    if link.scheme() != "http" && link.scheme() != "https" {
        return Ok(None);
    }

    link.set_query(None);
    link.set_fragment(None);

    if link.path().is_empty() || link.path() == "/" {
        return Ok(None);
    }

    tracing::trace!(origin = %origin, "Rewrote '{}' to '{}'", href, link);

    Ok(Some(link))
}

/// Parses and validates a seed URL
///
/// The seed must be absolute, use HTTP(S) and carry a host. Its fragment is
/// dropped; the query is kept since the seed page is requested as given.
pub fn parse_seed(seed: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}
