use crate::config::CrawlerConfig;
use crate::crawlers::frontier::CrawlFrontier;
use crate::error::PageLoadError;
use crate::filter::UrlFilter;
use crate::results::{CollectedText, CrawlReport, LoadedPage, PageFetch, PageVisit, SkipReason};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Loads one page and returns its visible text and raw anchor hrefs.
///
/// Each call is bounded by the implementation's own timeouts; a failure only
/// affects that page.
#[async_trait]
pub trait PageLoader: Send {
    async fn load(&mut self, url: &Url) -> Result<LoadedPage, PageLoadError>;

    /// Release any browser session held by the loader
    async fn close(&mut self) {}
}

/// Breadth-first, same-origin crawl limited to a page budget.
pub struct BoundedCrawler<L> {
    loader: L,
    filter: UrlFilter,
    page_budget: usize,
    text_budget: usize,
}

impl<L: PageLoader> BoundedCrawler<L> {
    pub fn new(loader: L, filter: UrlFilter, page_budget: usize, text_budget: usize) -> Self {
        Self {
            loader,
            filter,
            page_budget,
            text_budget,
        }
    }

    /// Build a crawler with the budgets from configuration
    pub fn from_config(loader: L, filter: UrlFilter, config: &CrawlerConfig) -> Self {
        Self::new(loader, filter, config.page_budget, config.text_budget)
    }

    /// Run the crawl to completion, budget exhaustion or cancellation.
    ///
    /// Never fails: pages that cannot be loaded are recorded as skipped, and a
    /// crawl that fetches nothing yields empty text.
    pub async fn crawl(&mut self, cancel: &CancellationToken) -> CrawlReport {
        let seed = self.filter.seed().clone();
        ::log::info!(
            "Starting bounded crawl of {} (budget {} pages)",
            seed,
            self.page_budget
        );
        let start = std::time::Instant::now();

        let mut frontier = CrawlFrontier::new(seed);
        let mut texts: Vec<String> = Vec::new();
        let mut visits: Vec<PageVisit> = Vec::new();
        let mut pages_fetched = 0;
        let mut cancelled = false;

        while pages_fetched < self.page_budget {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let Some(url) = frontier.pop() else {
                break;
            };

            if frontier.is_visited(&url) {
                ::log::trace!("Skipping already visited: {}", url);
                visits.push(skipped(&url, SkipReason::AlreadyVisited));
                continue;
            }
            if frontier.has_failed(&url) {
                ::log::trace!("Skipping previously failed: {}", url);
                visits.push(skipped(&url, SkipReason::PreviouslyFailed));
                continue;
            }

            let loaded = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.loader.load(&url) => Some(result),
            };
            let Some(loaded) = loaded else {
                cancelled = true;
                break;
            };

            let page = match loaded {
                Ok(page) => page,
                Err(e) => {
                    ::log::warn!("Skipping {}: {}", url, e);
                    frontier.mark_failed(&url);
                    visits.push(skipped(&url, e.into()));
                    continue;
                }
            };

            frontier.mark_visited(&url);
            pages_fetched += 1;
            visits.push(PageVisit {
                url: url.to_string(),
                outcome: PageFetch::Fetched {
                    chars: page.text.chars().count(),
                },
            });

            self.enqueue_links(&mut frontier, &url, &page.links);
            texts.push(page.text);
        }

        if cancelled {
            ::log::warn!(
                "Crawl cancelled after {} pages ({} still queued)",
                frontier.visited_count(),
                frontier.pending()
            );
        }

        let discarded = frontier.pending();
        let text = CollectedText::from_pages(&texts, self.text_budget);
        ::log::info!(
            "Crawl complete - fetched {} pages ({} chars kept, {} queued URLs discarded) in {:.2} seconds",
            pages_fetched,
            text.char_len(),
            discarded,
            start.elapsed().as_secs_f64()
        );

        CrawlReport {
            text,
            visits,
            pages_fetched,
            discarded,
            cancelled,
        }
    }

    /// Queue same-origin links from `page_url` that mention a relevance keyword
    fn enqueue_links(&self, frontier: &mut CrawlFrontier, page_url: &Url, links: &[String]) {
        let same_origin = self
            .filter
            .same_origin_links(page_url, links.iter().map(String::as_str));
        ::log::debug!(
            "{} of {} links on {} are same-origin",
            same_origin.len(),
            links.len(),
            page_url
        );

        for link in same_origin {
            if !self.filter.is_relevant(&link) {
                ::log::debug!("Not relevant, skipping: {}", link);
                continue;
            }
            let queued = link.to_string();
            if frontier.push(link) {
                ::log::info!("Queuing link for crawling: {}", queued);
            }
        }
    }

    /// Close the loader and hand it back
    pub async fn into_loader(mut self) -> L {
        self.loader.close().await;
        self.loader
    }
}

fn skipped(url: &Url, reason: SkipReason) -> PageVisit {
    PageVisit {
        url: url.to_string(),
        outcome: PageFetch::Skipped { reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_RELEVANCE_KEYWORDS;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// In-memory site: URL -> page, anything else fails like a DNS error
    #[derive(Default)]
    struct ScriptedLoader {
        pages: HashMap<String, Result<LoadedPage, PageLoadError>>,
        fetches: Vec<String>,
    }

    impl ScriptedLoader {
        fn page(mut self, url: &str, text: &str, links: &[&str]) -> Self {
            let links = links.iter().map(|l| l.to_string()).collect();
            self.pages
                .insert(url.to_string(), Ok(LoadedPage::new(text, links)));
            self
        }

        fn failing(mut self, url: &str, err: PageLoadError) -> Self {
            self.pages.insert(url.to_string(), Err(err));
            self
        }
    }

    #[async_trait]
    impl PageLoader for ScriptedLoader {
        async fn load(&mut self, url: &Url) -> Result<LoadedPage, PageLoadError> {
            self.fetches.push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .unwrap_or_else(|| Err(PageLoadError::Navigation("name not resolved".into())))
        }
    }

    fn crawler(loader: ScriptedLoader, seed: &str, budget: usize) -> BoundedCrawler<ScriptedLoader> {
        let keywords: Vec<String> = DEFAULT_RELEVANCE_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .collect();
        let filter = UrlFilter::new(&Url::parse(seed).unwrap(), &keywords, &[]).unwrap();
        BoundedCrawler::new(loader, filter, budget, 8000)
    }

    async fn run(crawler: &mut BoundedCrawler<ScriptedLoader>) -> CrawlReport {
        crawler.crawl(&CancellationToken::new()).await
    }

    #[tokio::test]
    async fn test_unreachable_seed_gives_empty_text() {
        let mut crawler = crawler(ScriptedLoader::default(), "https://down.test/", 8);
        let report = run(&mut crawler).await;

        assert!(report.text.is_empty());
        assert_eq!(report.pages_fetched, 0);
        let skipped: Vec<_> = report.skipped().collect();
        assert_eq!(skipped.len(), 1);
        assert!(matches!(
            skipped[0].1,
            SkipReason::LoadFailed(PageLoadError::Navigation(_))
        ));
    }

    #[tokio::test]
    async fn test_single_page_without_anchors() {
        let loader = ScriptedLoader::default().page(
            "https://shop.test/",
            "Acme Bakery\nOpen daily 7am-3pm",
            &[],
        );
        let mut crawler = crawler(loader, "https://shop.test/", 8);
        let report = run(&mut crawler).await;

        assert_eq!(report.text.as_str(), "Acme Bakery\nOpen daily 7am-3pm");
        assert_eq!(report.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_cross_origin_links_never_fetched() {
        let loader = ScriptedLoader::default()
            .page(
                "https://shop.test/",
                "home",
                &[
                    "https://facebook.com/contact",
                    "http://shop.test/about",
                    "https://cdn.shop.test/info",
                    "/contact",
                ],
            )
            .page("https://shop.test/contact", "contact", &[]);
        let mut crawler = crawler(loader, "https://shop.test/", 8);
        let report = run(&mut crawler).await;

        let fetches = &crawler.loader.fetches;
        assert_eq!(fetches, &["https://shop.test/", "https://shop.test/contact"]);
        assert!(fetches.iter().all(|u| u.starts_with("https://shop.test/")));
        assert_eq!(report.text.as_str(), "home\n\ncontact");
    }

    #[tokio::test]
    async fn test_no_url_fetched_twice() {
        let loader = ScriptedLoader::default()
            .page(
                "https://shop.test/",
                "home",
                &["/about", "/about#team", "/contact", "/about"],
            )
            .page("https://shop.test/about", "about", &["/contact", "/", "/about"])
            .page("https://shop.test/contact", "contact", &["/about", "/contact"]);
        let mut crawler = crawler(loader, "https://shop.test/", 8);
        let report = run(&mut crawler).await;

        let mut fetches = crawler.loader.fetches.clone();
        let total = fetches.len();
        fetches.sort();
        fetches.dedup();
        assert_eq!(fetches.len(), total);
        assert_eq!(report.pages_fetched, 3);
        assert!(
            report
                .skipped()
                .all(|(_, reason)| *reason == SkipReason::AlreadyVisited)
        );
    }

    #[tokio::test]
    async fn test_failed_page_not_retried() {
        let loader = ScriptedLoader::default()
            .page("https://shop.test/", "home", &["/contact", "/about"])
            .failing("https://shop.test/contact", PageLoadError::IdleTimeout)
            .page("https://shop.test/about", "about", &["/contact"]);
        let mut crawler = crawler(loader, "https://shop.test/", 8);
        let report = run(&mut crawler).await;

        let attempts = crawler
            .loader
            .fetches
            .iter()
            .filter(|u| u.as_str() == "https://shop.test/contact")
            .count();
        assert_eq!(attempts, 1);
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.text.as_str(), "home\n\nabout");
        assert!(report.skipped().any(|(url, reason)| url == "https://shop.test/contact"
            && *reason == SkipReason::LoadFailed(PageLoadError::IdleTimeout)));
    }

    #[tokio::test]
    async fn test_budget_of_one_discards_frontier() {
        let loader = ScriptedLoader::default().page(
            "https://shop.test/",
            "home",
            &["/about", "/contact", "/team", "/services", "/privacy"],
        );
        let mut crawler = crawler(loader, "https://shop.test/", 1);
        let report = run(&mut crawler).await;

        assert_eq!(crawler.loader.fetches, vec!["https://shop.test/"]);
        assert_eq!(report.pages_fetched, 1);
        assert_eq!(report.discarded, 5);
    }

    #[tokio::test]
    async fn test_budget_counts_only_successful_pages() {
        let loader = ScriptedLoader::default()
            .page("https://shop.test/", "home", &["/about", "/contact", "/team"])
            .page("https://shop.test/contact", "contact", &[])
            .page("https://shop.test/team", "team", &[]);
        let mut crawler = crawler(loader, "https://shop.test/", 2);
        let report = run(&mut crawler).await;

        // /about fails and does not consume budget
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.text.as_str(), "home\n\ncontact");
        assert_eq!(report.discarded, 1);
    }

    #[tokio::test]
    async fn test_irrelevant_links_not_followed() {
        let loader = ScriptedLoader::default().page(
            "https://shop.test/",
            "home",
            &["/blog/spring-sale", "/products/bread", "/Contact-Us"],
        );
        let mut crawler = crawler(loader, "https://shop.test/", 8);
        run(&mut crawler).await;

        assert_eq!(
            crawler.loader.fetches,
            vec!["https://shop.test/", "https://shop.test/Contact-Us"]
        );
    }

    #[tokio::test]
    async fn test_breadth_first_concatenation_order() {
        let loader = ScriptedLoader::default()
            .page("https://shop.test/", "home", &["/about", "/contact"])
            .page("https://shop.test/about", "about", &["/about/team"])
            .page("https://shop.test/contact", "contact", &[])
            .page("https://shop.test/about/team", "team", &[]);
        let mut crawler = crawler(loader, "https://shop.test/", 8);
        let report = run(&mut crawler).await;

        assert_eq!(report.text.as_str(), "home\n\nabout\n\ncontact\n\nteam");
        let fetched: Vec<&str> = report.fetched_urls().collect();
        assert_eq!(
            fetched,
            vec![
                "https://shop.test/",
                "https://shop.test/about",
                "https://shop.test/contact",
                "https://shop.test/about/team"
            ]
        );
    }

    #[tokio::test]
    async fn test_links_resolved_against_page_url() {
        let loader = ScriptedLoader::default()
            .page("https://shop.test/", "home", &["/services/"])
            .page("https://shop.test/services/", "services", &["hours"])
            .page("https://shop.test/services/hours", "hours", &[]);
        let mut crawler = crawler(loader, "https://shop.test/", 8);
        let report = run(&mut crawler).await;

        assert_eq!(report.pages_fetched, 3);
    }

    #[tokio::test]
    async fn test_collected_text_respects_budget() {
        let long = "x".repeat(6000);
        let loader = ScriptedLoader::default()
            .page("https://shop.test/", &long, &["/about"])
            .page("https://shop.test/about", &long, &[]);
        let mut crawler = crawler(loader, "https://shop.test/", 8);
        let report = run(&mut crawler).await;

        assert_eq!(report.text.char_len(), 8000);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let loader = ScriptedLoader::default().page("https://shop.test/", "home", &[]);
        let mut crawler = crawler(loader, "https://shop.test/", 8);
        let token = CancellationToken::new();
        token.cancel();

        let report = crawler.crawl(&token).await;
        assert!(report.cancelled);
        assert!(report.text.is_empty());
        assert!(crawler.loader.fetches.is_empty());
    }

    /// Serves the seed, then hangs on every other page after signalling `started`
    struct HangingLoader {
        started: Arc<Notify>,
    }

    #[async_trait]
    impl PageLoader for HangingLoader {
        async fn load(&mut self, url: &Url) -> Result<LoadedPage, PageLoadError> {
            if url.path() == "/" {
                return Ok(LoadedPage::new("home", vec!["/contact".to_string()]));
            }
            self.started.notify_one();
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancelled_during_page_load() {
        let started = Arc::new(Notify::new());
        let loader = HangingLoader {
            started: started.clone(),
        };
        let filter = UrlFilter::new(
            &Url::parse("https://shop.test/").unwrap(),
            &["contact".to_string()],
            &[],
        )
        .unwrap();
        let mut crawler = BoundedCrawler::new(loader, filter, 8, 8000);
        let token = CancellationToken::new();

        let cancel_when_loading = async {
            started.notified().await;
            token.cancel();
        };
        let (report, ()) = tokio::join!(crawler.crawl(&token), cancel_when_loading);

        assert!(report.cancelled);
        assert_eq!(report.pages_fetched, 1);
        assert_eq!(report.text.as_str(), "home");
        let fetched: Vec<_> = report.fetched_urls().collect();
        assert_eq!(fetched, vec!["https://shop.test/"]);
        assert_eq!(report.skipped().count(), 0);
    }
}
