use crate::UrlError;
use url::Url;

/// The crawl boundary defined by the seed URL
///
/// A link is in scope when its host and port equal the seed's. Default ports
/// are normalized away by the parser, so `https://x.test:443/` and
/// `https://x.test/` share a scope.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    seed: Url,
}

impl CrawlScope {
    /// Creates a scope from a parsed seed URL
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use hostcrawl::url::CrawlScope;
    ///
    /// let scope = CrawlScope::new(Url::parse("https://x.test/").unwrap()).unwrap();
    /// assert!(scope.contains(&Url::parse("https://x.test/a").unwrap()));
    /// assert!(!scope.contains(&Url::parse("https://other.test/b").unwrap()));
    /// ```
    pub fn new(seed: Url) -> Result<Self, UrlError> {
        if seed.host_str().is_none() {
            return Err(UrlError::MissingHost);
        }
        Ok(Self { seed })
    }

    /// The seed URL the crawl starts from
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// The scope host
    pub fn host(&self) -> &str {
        self.seed.host_str().unwrap_or_default()
    }

    /// Returns true if the link belongs to the crawl scope
    pub fn contains(&self, link: &Url) -> bool {
        link.host_str() == self.seed.host_str() && link.port() == self.seed.port()
    }

    /// Keeps only the links that belong to the crawl scope
    pub fn retain<I>(&self, links: I) -> Vec<Url>
    where
        I: IntoIterator<Item = Url>,
    {
        links
            .into_iter()
            .filter(|link| {
                let keep = self.contains(link);
                if !keep {
                    tracing::trace!("Filtering out out-of-scope link {}", link);
                }
                keep
            })
            .collect()
    }
}
