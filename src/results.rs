use crate::error::PageLoadError;
use crate::utils::truncate_chars;
use serde::Serialize;
use std::fmt;

/// What a page loader hands back for one successfully loaded page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedPage {
    /// Visible text of the page body
    pub text: String,

    /// Raw href values of the page's anchors, in document order
    pub links: Vec<String>,
}

impl LoadedPage {
    pub fn new(text: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            text: text.into(),
            links,
        }
    }
}

/// Why a dequeued URL produced no text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Already fetched earlier in this crawl
    AlreadyVisited,
    /// A previous attempt at this URL failed; it is not retried
    PreviouslyFailed,
    /// Navigation, settling or reading the page failed
    LoadFailed(PageLoadError),
}

impl From<PageLoadError> for SkipReason {
    fn from(err: PageLoadError) -> Self {
        SkipReason::LoadFailed(err)
    }
}

/// Tagged outcome of one frontier entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageFetch {
    Fetched { chars: usize },
    Skipped { reason: SkipReason },
}

/// One dequeued URL and what happened to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageVisit {
    pub url: String,
    pub outcome: PageFetch,
}

/// Concatenated page text, already cut to the character budget
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CollectedText(String);

impl CollectedText {
    /// Join page texts with a blank line and truncate to `budget` characters
    pub fn from_pages<S: AsRef<str>>(pages: &[S], budget: usize) -> Self {
        let joined = pages
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join("\n\n");
        Self(truncate_chars(&joined, budget).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters, not bytes
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for CollectedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a bounded crawl
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    /// The only artifact passed on to extraction
    pub text: CollectedText,

    /// Every dequeued URL in visit order
    pub visits: Vec<PageVisit>,

    /// Number of pages successfully fetched; never exceeds the page budget
    pub pages_fetched: usize,

    /// URLs still queued when the budget ran out
    pub discarded: usize,

    /// The crawl stopped early because of cancellation
    pub cancelled: bool,
}

impl CrawlReport {
    /// URLs that were actually fetched, in order
    pub fn fetched_urls(&self) -> impl Iterator<Item = &str> {
        self.visits.iter().filter_map(|v| match v.outcome {
            PageFetch::Fetched { .. } => Some(v.url.as_str()),
            PageFetch::Skipped { .. } => None,
        })
    }

    /// Skipped URLs together with the reason
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.visits.iter().filter_map(|v| match &v.outcome {
            PageFetch::Skipped { reason } => Some((v.url.as_str(), reason)),
            PageFetch::Fetched { .. } => None,
        })
    }
}
