//! Whitespace handling shared by the HTML parser and field cleaning.

/// Collapse every run of whitespace (including newlines) into one space and trim the ends.
///
/// Applying it twice gives the same result as applying it once.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when the text has no visible characters
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
