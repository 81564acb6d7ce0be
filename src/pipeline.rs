use crate::config::CrawlerConfig;
use crate::crawlers::{BoundedCrawler, PageLoader, WebDriverLoader};
use crate::error::PipelineError;
use crate::extract::{BusinessRecord, SchemaExtractor};
use crate::filter::UrlFilter;
use crate::llm::ChatClient;
use crate::results::CrawlReport;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What one run produced: the crawl details and the finished record
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub report: CrawlReport,
    pub record: BusinessRecord,
}

/// Crawl a site, then extract the business record from what was collected.
pub struct Pipeline {
    config: CrawlerConfig,
    extractor: SchemaExtractor,
}

impl Pipeline {
    pub fn new(config: CrawlerConfig, client: Arc<dyn ChatClient>) -> Self {
        Self {
            config,
            extractor: SchemaExtractor::new(client),
        }
    }

    /// Run against a real browser. `input` is the URL as the user typed it.
    pub async fn run(
        &self,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutput, PipelineError> {
        let seed = normalize_seed_url(input)?;
        let filter = UrlFilter::from_config(&seed, &self.config)?;

        let mut loader = WebDriverLoader::from_config(&self.config);
        loader.connect().await.map_err(PipelineError::Browser)?;

        let crawler = BoundedCrawler::from_config(loader, filter, &self.config);
        self.crawl_and_extract(crawler, &seed, cancel).await
    }

    /// Run with any page loader; `seed` must already be normalised
    pub async fn run_with_loader<L: PageLoader>(
        &self,
        loader: L,
        seed: &Url,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutput, PipelineError> {
        let filter = UrlFilter::from_config(seed, &self.config)?;
        let crawler = BoundedCrawler::from_config(loader, filter, &self.config);
        self.crawl_and_extract(crawler, seed, cancel).await
    }

    async fn crawl_and_extract<L: PageLoader>(
        &self,
        mut crawler: BoundedCrawler<L>,
        seed: &Url,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutput, PipelineError> {
        let report = crawler.crawl(cancel).await;
        crawler.into_loader().await;

        if report.cancelled {
            return Err(PipelineError::Cancelled);
        }
        ::log::info!(
            "Crawl finished: {} pages, {} chars of text",
            report.pages_fetched,
            report.text.char_len()
        );

        let record = self
            .extractor
            .extract(&report.text, seed.as_str(), cancel)
            .await?;

        Ok(PipelineOutput { report, record })
    }
}

/// Turn user input into a crawlable seed URL.
///
/// Adds `https://` when no http(s) scheme is given and rejects input that
/// cannot be a real site address.
pub fn normalize_seed_url(input: &str) -> Result<Url, PipelineError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidSeedUrl("empty URL".into()));
    }

    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    if !candidate.contains('.') || candidate.chars().count() < 10 {
        return Err(PipelineError::InvalidSeedUrl(trimmed.to_string()));
    }

    let url = Url::parse(&candidate)
        .map_err(|e| PipelineError::InvalidSeedUrl(format!("{}: {}", trimmed, e)))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(PipelineError::InvalidSeedUrl(trimmed.to_string())),
    }
}
