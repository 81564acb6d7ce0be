pub mod crawler;
pub mod frontier;
pub mod web;

pub use crawler::{BoundedCrawler, PageLoader};
pub use frontier::CrawlFrontier;
pub use web::WebDriverLoader;
