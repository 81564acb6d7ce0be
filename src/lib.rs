//! Crawl a business website and turn it into a filled-in assistant prompt.
//!
//! A bounded same-origin crawl collects page text, one language-model request
//! extracts a fixed schema of business fields from it, and any field that
//! could not be determined is set to [`extract::SENTINEL`].

pub mod analysis;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod extract;
pub mod filter;
pub mod llm;
pub mod parsers;
pub mod pipeline;
pub mod results;
pub mod template;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::PipelineError;
pub use extract::{BusinessRecord, SENTINEL};
pub use pipeline::{Pipeline, PipelineOutput, normalize_seed_url};
pub use results::CrawlReport;
