/// Cut `text` to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Convert a string to a sanitized filename
pub fn sanitize_filename(name: &str) -> String {
    // Remove protocol and replace invalid filename characters
    let mut name = name.replace("http://", "").replace("https://", "");
    name = name.replace(['/', '\\', ':', '?', '&', '=', '#', '%', '*', '"', '<', '>', '|'], "_");
    name = name.split_whitespace().collect::<Vec<_>>().join("_");

    // Limit filename length
    truncate_chars(&name, 100).to_string()
}
