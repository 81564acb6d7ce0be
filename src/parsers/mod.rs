pub mod html;
pub mod text;


/// Result of parsing a page source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// Extracted visible text
    pub content: String,
    /// Raw anchor hrefs in document order
    pub links: Vec<String>,
}

impl ParseResult {
    /// Creates a new parse result with the given content and links
    pub fn new(content: String, links: Vec<String>) -> Self {
        Self { content, links }
    }
}
