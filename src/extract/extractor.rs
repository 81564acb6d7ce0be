use super::record::{BusinessRecord, FieldMap};
use super::schema::{SECTIONS, field_name};
use super::value::flatten_value;
use crate::error::{ExtractionError, ParseFailure};
use crate::llm::{ChatClient, ChatRequest, Message};
use crate::results::CollectedText;
use serde_json::{Map, Value};
use std::fmt::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const SYSTEM_PROMPT: &str = "You are an expert business information extractor. \
    Extract comprehensive, accurate business details from web page text, \
    including pricing, locations, policies and branding.";

/// Asks the model for the business schema in one request and turns the
/// answer into a [`BusinessRecord`].
pub struct SchemaExtractor {
    client: Arc<dyn ChatClient>,
}

impl SchemaExtractor {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    /// Extract a complete record for the site at `website_url`.
    ///
    /// An unparseable answer (or no crawled text at all) gives the all-sentinel
    /// record. Only failing to reach the model, or cancellation, is an error.
    pub async fn extract(
        &self,
        text: &CollectedText,
        website_url: &str,
        cancel: &CancellationToken,
    ) -> Result<BusinessRecord, ExtractionError> {
        if text.as_str().trim().is_empty() {
            if cancel.is_cancelled() {
                return Err(ExtractionError::Cancelled);
            }
            ::log::info!("No page text collected for {}, skipping extraction", website_url);
            return Ok(BusinessRecord::unavailable(website_url));
        }

        match self.extract_fields(text.as_str(), cancel).await {
            Ok(fields) => {
                let record = BusinessRecord::complete(&fields, website_url);
                ::log::info!(
                    "Extracted {} of {} fields for {}",
                    record.available_count(),
                    super::schema::FIELDS.len() - 1,
                    website_url
                );
                Ok(record)
            }
            Err(ExtractionError::Parse(reason)) => {
                ::log::warn!(
                    "Model answer for {} unusable ({}), falling back to empty record",
                    website_url,
                    reason
                );
                Ok(BusinessRecord::unavailable(website_url))
            }
            Err(e) => Err(e),
        }
    }

    /// Send the extraction request and return the flattened fields.
    ///
    /// Unlike [`extract`](Self::extract) this fails on an unparseable answer.
    pub async fn extract_fields(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<FieldMap, ExtractionError> {
        if cancel.is_cancelled() {
            return Err(ExtractionError::Cancelled);
        }

        let request = build_request(text);
        ::log::debug!("Sending extraction request ({} chars of page text)", text.chars().count());

        let completion = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ExtractionError::Cancelled),
            result = self.client.complete(&request) => result?,
        };

        Ok(parse_response(&completion.content)?)
    }
}

/// The extraction request: system framing plus the instruction prompt, temperature 0
pub fn build_request(text: &str) -> ChatRequest {
    ChatRequest::new()
        .message(Message::system(SYSTEM_PROMPT))
        .message(Message::user(build_prompt(text)))
        .temperature(0.0)
}

/// Instruction block listing every section and field, followed by the page text verbatim
pub fn build_prompt(text: &str) -> String {
    let mut prompt = String::from(
        "Extract the following business information from the website text below. \
         If a field is not found, use \"Not available\".\n\
         Be thorough with pricing, service durations and contact details: look for \
         dollar amounts ($), packages, course lengths and service costs.\n\
         Answer with one JSON object. Its keys are the section names below; each \
         section maps the listed field names to string values.\n",
    );

    for section in SECTIONS.iter() {
        let _ = write!(prompt, "\n{}:\n", section.title);
        for spec in section.fields {
            let _ = writeln!(prompt, "- {}: {}", spec.name, spec.hint);
        }
    }

    prompt.push_str("\nText:\n");
    prompt.push_str(text);
    prompt.push('\n');
    prompt
}

/// Read the model answer: take the span from the first `{` to the last `}`,
/// parse it and flatten the sections.
pub fn parse_response(raw: &str) -> Result<FieldMap, ParseFailure> {
    let json = locate_json_object(raw).ok_or(ParseFailure::NoJsonObject)?;
    let doc: Map<String, Value> =
        serde_json::from_str(json).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;
    Ok(flatten_sections(&doc))
}

/// Slice between the first `{` and the last `}` inclusive
fn locate_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Merge the section objects into one flat mapping.
///
/// Top-level keys that are themselves schema fields are taken first, then each
/// known section in order; a key repeated in a later section overwrites the
/// earlier value. Values are flattened to strings and absent ones dropped.
pub fn flatten_sections(doc: &Map<String, Value>) -> FieldMap {
    let mut fields = FieldMap::new();

    for (key, value) in doc {
        if field_name(key).is_some() {
            insert_flattened(&mut fields, key, value);
        }
    }

    for section in SECTIONS.iter() {
        match doc.get(section.title) {
            Some(Value::Object(entries)) => {
                for (key, value) in entries {
                    insert_flattened(&mut fields, key, value);
                }
            }
            Some(other) => {
                // A bare value where a section object was expected
                ::log::debug!("Ignoring non-object section {:?}: {}", section.title, other);
            }
            None => {}
        }
    }

    fields
}

fn insert_flattened(fields: &mut FieldMap, key: &str, value: &Value) {
    match flatten_value(value) {
        Some(flat) => {
            fields.insert(key.to_string(), flat);
        }
        None => {
            fields.remove(key);
        }
    }
}
