use crate::config::CrawlerConfig;
use regex::Regex;
use url::Url;

/// Link schemes that never lead to a crawlable page
const IGNORED_SCHEMES: [&str; 2] = ["mailto:", "tel:"];

/// Decides which discovered links belong to the crawl.
///
/// A link is kept when it resolves to the same scheme and host as the seed URL
/// and is not excluded by a pattern. Relevance (keyword match) is a separate
/// check so callers can tell "off-site" apart from "not interesting".
#[derive(Debug)]
pub struct UrlFilter {
    seed: Url,
    relevance: Option<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a filter anchored at `seed` with the given keywords and exclude patterns
    pub fn new(
        seed: &Url,
        keywords: &[String],
        exclude_patterns: &[String],
    ) -> Result<Self, regex::Error> {
        let relevance = if keywords.is_empty() {
            None
        } else {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!("(?i)(?:{})", alternation))?)
        };

        let mut exclude_regexes = Vec::with_capacity(exclude_patterns.len());
        for pattern in exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            seed: seed.clone(),
            relevance,
            exclude_regexes,
        })
    }

    /// Build a filter from crawler configuration
    pub fn from_config(seed: &Url, config: &CrawlerConfig) -> Result<Self, regex::Error> {
        Self::new(seed, &config.relevance_keywords, &config.exclude_patterns)
    }

    /// The seed URL this filter compares origins against
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Resolve a raw href found on `page_url` into a crawlable same-origin URL.
    ///
    /// Returns `None` for mailto/tel links, unresolvable hrefs, other origins and
    /// excluded URLs. The returned URL has its fragment stripped.
    pub fn resolve(&self, page_url: &Url, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let lowered = href.to_ascii_lowercase();
        if IGNORED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
            return None;
        }

        let resolved = page_url.join(href).ok()?;
        if !self.is_same_origin(&resolved) {
            ::log::trace!("Rejected off-site link: {}", resolved);
            return None;
        }

        let normalized = normalize_url(&resolved);
        let url_str = normalized.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(url_str)) {
            ::log::trace!("Rejected excluded link: {}", normalized);
            return None;
        }

        Some(normalized)
    }

    /// Resolve every href on a page, keeping first-seen order and dropping duplicates
    pub fn same_origin_links<'a, I>(&self, page_url: &Url, hrefs: I) -> Vec<Url>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut links: Vec<Url> = Vec::new();
        for href in hrefs {
            if let Some(url) = self.resolve(page_url, href) {
                if !links.contains(&url) {
                    links.push(url);
                }
            }
        }
        links
    }

    /// Check whether the URL string contains one of the relevance keywords
    pub fn is_relevant(&self, url: &Url) -> bool {
        match &self.relevance {
            Some(regex) => regex.is_match(url.as_str()),
            None => true,
        }
    }

    /// Scheme and host match against the seed. Ports are not compared.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.scheme() == self.seed.scheme()
            && url.host_str().is_some()
            && url.host_str() == self.seed.host_str()
    }
}

/// Create a normalized version of the URL (removing the fragment)
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}
