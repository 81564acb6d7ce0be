use crate::parsers::ParseResult;
use crate::parsers::text::collapse_whitespace;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// Elements whose text never renders
const HIDDEN_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Parses HTML content to extract body text and anchor hrefs
pub fn parse(html: &str) -> ParseResult {
    let doc = Html::parse_document(html);
    let text = body_text(&doc);
    let links = anchor_hrefs(&doc);

    ::log::debug!("HTML parser found {} links", links.len());
    if !links.is_empty() {
        ::log::trace!(
            "First few links: {:?}",
            links.iter().take(5).collect::<Vec<_>>()
        );
    }

    ParseResult::new(text, links)
}

/// Text of the body with script/style content left out and whitespace collapsed
fn body_text(doc: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for body in doc.select(&BODY) {
        for node in body.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_TAGS.contains(&e.name()))
            });
            if !hidden {
                parts.push(&**text);
            }
        }
    }
    collapse_whitespace(&parts.join(" "))
}

fn anchor_hrefs(doc: &Html) -> Vec<String> {
    doc.select(&ANCHORS)
        .filter_map(|e| e.value().attr("href"))
        .map(|s| s.to_string())
        .collect()
}
