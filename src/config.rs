use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Link keywords that mark a same-origin page as worth visiting
pub const DEFAULT_RELEVANCE_KEYWORDS: [&str; 13] = [
    "contact", "about", "footer", "info", "service", "hours", "payment", "team", "staff",
    "social", "policy", "privacy", "terms",
];

/// Configuration for the bounded crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages successfully fetched per crawl
    #[serde(default = "default_page_budget")]
    pub page_budget: usize,

    /// Upper bound on a single navigation, in seconds
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Upper bound on waiting for the network to settle after navigation
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Maximum characters of collected text handed to the extractor
    #[serde(default = "default_text_budget")]
    pub text_budget: usize,

    /// Case-insensitive substrings a discovered link must contain to be queued
    #[serde(default = "default_relevance_keywords")]
    pub relevance_keywords: Vec<String>,

    /// Regex patterns for URLs that are never queued
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

/// Configuration for the language-model client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Bearer credential; read from `OPENAI_API_KEY` rather than written to disk
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Total attempts for retryable failures (timeouts, 429, 5xx)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_page_budget() -> usize {
    8
}

fn default_navigation_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    20
}

fn default_text_budget() -> usize {
    8000
}

fn default_relevance_keywords() -> Vec<String> {
    DEFAULT_RELEVANCE_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

fn default_max_retries() -> usize {
    3
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_budget: default_page_budget(),
            navigation_timeout_secs: default_navigation_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            text_budget: default_text_budget(),
            relevance_keywords: default_relevance_keywords(),
            exclude_patterns: Vec::new(),
            webdriver_url: default_webdriver_url(),
        }
    }
}

impl CrawlerConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("WEBDRIVER_URL") {
            self.crawler.webdriver_url = url;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.llm.model = model;
        }
    }

    /// Reject settings that would make a crawl or request meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.crawler;
        if c.page_budget == 0 {
            return Err(ConfigError::Invalid("page_budget must be at least 1".into()));
        }
        if c.text_budget == 0 {
            return Err(ConfigError::Invalid("text_budget must be at least 1".into()));
        }
        if c.navigation_timeout_secs == 0 || c.idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid("page timeouts must be non-zero".into()));
        }
        for pattern in &c.exclude_patterns {
            regex::Regex::new(pattern).map_err(|e| {
                ConfigError::Invalid(format!("bad exclude pattern '{}': {}", pattern, e))
            })?;
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model name is empty".into()));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request timeout must be non-zero".into()));
        }
        Ok(())
    }
}
