use serde::Serialize;
use thiserror::Error;

/// Why a single page could not be loaded. Never aborts a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", content = "message", rename_all = "snake_case")]
pub enum PageLoadError {
    /// Navigation did not finish within the navigation timeout
    #[error("navigation timed out")]
    NavigationTimeout,

    /// The page never settled within the idle timeout
    #[error("network did not settle in time")]
    IdleTimeout,

    /// The browser reported a navigation failure (DNS, refused, bad status page)
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The page loaded but its text or source could not be read
    #[error("could not read page content: {0}")]
    Content(String),

    /// The WebDriver session was lost and could not be recovered
    #[error("webdriver session lost: {0}")]
    Session(String),
}

/// Errors talking to the language-model endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing API key or invalid client settings
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection failure or request timeout
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response from the endpoint
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response envelope was not the expected chat-completion shape
    #[error("parse error: {0}")]
    Parse(String),

    /// The endpoint answered without any choices
    #[error("model returned no choices")]
    EmptyResponse,
}

/// Why a model answer could not be read as the sectioned JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

/// Errors from the schema extraction step.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The model could not be reached or refused the request
    #[error("model request failed: {0}")]
    Request(#[from] LlmError),

    /// The model answered, but not with a usable document
    #[error("model response unparseable: {0}")]
    Parse(#[from] ParseFailure),

    #[error("extraction cancelled")]
    Cancelled,
}

/// Errors surfaced by the crawl + extract pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid seed URL: {0}")]
    InvalidSeedUrl(String),

    /// Exclude patterns or keywords did not compile
    #[error("invalid link filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    /// No browser session could be opened at all
    #[error("browser unavailable: {0}")]
    Browser(String),

    #[error(transparent)]
    Extraction(ExtractionError),

    #[error("pipeline cancelled")]
    Cancelled,
}

impl From<ExtractionError> for PipelineError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Extraction(other),
        }
    }
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors loading a prompt template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template file '{0}' not found")]
    Missing(String),

    #[error("could not read template: {0}")]
    Io(#[from] std::io::Error),
}
