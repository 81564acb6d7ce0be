use crate::config::CrawlerConfig;
use crate::crawlers::crawler::PageLoader;
use crate::error::PageLoadError;
use crate::parsers;
use crate::results::LoadedPage;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// How often the page is polled while waiting for the network to settle
const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Returns `[document.readyState, number of resource entries]`
const SETTLE_PROBE: &str = "return [document.readyState, \
     (window.performance && performance.getEntriesByType) \
     ? performance.getEntriesByType('resource').length : 0];";

/// Loads pages through a WebDriver-controlled browser.
///
/// The session is opened lazily on the first load and reused for the whole
/// crawl. A lost session is reconnected once per page.
pub struct WebDriverLoader {
    webdriver_url: String,
    navigation_timeout: Duration,
    idle_timeout: Duration,
    client: Option<Client>,
}

impl WebDriverLoader {
    pub fn new(webdriver_url: &str, navigation_timeout: Duration, idle_timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            navigation_timeout,
            idle_timeout,
            client: None,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            &config.webdriver_url,
            config.navigation_timeout(),
            config.idle_timeout(),
        )
    }

    /// Open the browser session now instead of on the first page.
    ///
    /// Lets callers tell "no browser available" apart from "page failed".
    pub async fn connect(&mut self) -> Result<(), String> {
        if self.client.is_none() {
            self.client = Some(connect_to_webdriver(&self.webdriver_url).await?);
        }
        Ok(())
    }

    async fn load_once(&mut self, url: &Url) -> Result<LoadedPage, PageLoadError> {
        if self.client.is_none() {
            let client = connect_to_webdriver(&self.webdriver_url)
                .await
                .map_err(PageLoadError::Session)?;
            self.client = Some(client);
        }
        let Some(client) = self.client.as_ref() else {
            return Err(PageLoadError::Session("no webdriver session".into()));
        };

        let started = std::time::Instant::now();

        match timeout(self.navigation_timeout, client.goto(url.as_str())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(classify(e, PageLoadError::Navigation)),
            Err(_) => return Err(PageLoadError::NavigationTimeout),
        }

        match timeout(self.idle_timeout, wait_for_settle(client)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(classify(e, PageLoadError::Content)),
            Err(_) => return Err(PageLoadError::IdleTimeout),
        }

        let source = client
            .source()
            .await
            .map_err(|e| classify(e, PageLoadError::Content))?;
        let parsed = parsers::html::parse(&source);

        // Rendered text is what a visitor sees; fall back to the parsed source
        let text = match visible_body_text(client).await {
            Ok(text) => text,
            Err(e) => {
                ::log::debug!("Falling back to parsed body text for {}: {}", url, e);
                parsed.content
            }
        };

        ::log::debug!(
            "Loaded {} in {:.2} seconds ({} links)",
            url,
            started.elapsed().as_secs_f64(),
            parsed.links.len()
        );

        Ok(LoadedPage::new(text, parsed.links))
    }

    /// Attempts to reconnect the WebDriver client
    async fn reconnect(&mut self) -> bool {
        ::log::warn!("Attempting to reconnect WebDriver session");
        if let Some(old) = self.client.take() {
            let _ = old.close().await;
        }
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                self.client = Some(client);
                ::log::info!("Successfully reconnected to WebDriver");
                true
            }
            Err(e) => {
                ::log::error!("Failed to reconnect to WebDriver: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl PageLoader for WebDriverLoader {
    async fn load(&mut self, url: &Url) -> Result<LoadedPage, PageLoadError> {
        match self.load_once(url).await {
            Err(PageLoadError::Session(reason)) if self.client.is_some() => {
                if self.reconnect().await {
                    self.load_once(url).await
                } else {
                    Err(PageLoadError::Session(reason))
                }
            }
            other => other,
        }
    }

    async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver client: {}", e);
            }
        }
    }
}

/// Connects to the WebDriver instance, trying common local ports after the configured one
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, String> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
        }
    }

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // geckodriver / Selenium default
        "http://127.0.0.1:4444",
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    Err(format!(
        "could not connect to a WebDriver server at {} (set WEBDRIVER_URL)",
        webdriver_url
    ))
}

/// Wait until the document is complete and no new resources appeared between two polls
async fn wait_for_settle(client: &Client) -> Result<(), CmdError> {
    let mut last_count: Option<u64> = None;
    loop {
        let probe = client.execute(SETTLE_PROBE, Vec::new()).await?;
        let ready = probe.get(0).and_then(|v| v.as_str()) == Some("complete");
        let count = probe.get(1).and_then(|v| v.as_u64()).unwrap_or(0);

        if ready && last_count == Some(count) {
            return Ok(());
        }
        last_count = if ready { Some(count) } else { None };
        tokio::time::sleep(SETTLE_POLL_INTERVAL).await;
    }
}

/// Rendered text of the body element, as the browser lays it out
async fn visible_body_text(client: &Client) -> Result<String, CmdError> {
    let body = client.find(Locator::Css("body")).await?;
    body.text().await
}

/// Map a WebDriver command error onto a page error, spotting lost sessions
fn classify(error: CmdError, otherwise: fn(String) -> PageLoadError) -> PageLoadError {
    let message = error.to_string();
    if message.contains("invalid session id") || message.contains("Unable to find session") {
        PageLoadError::Session(message)
    } else {
        otherwise(message)
    }
}
