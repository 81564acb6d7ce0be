//! Turning arbitrary model-produced JSON into scalar strings.
//!
//! Join rules:
//! - strings are kept as they are; blank strings count as absent
//! - numbers and booleans use their JSON spelling
//! - arrays join their non-absent elements with `", "`
//! - objects join `"key: value"` pairs of non-absent values with `"; "`
//! - `null`, and arrays or objects with nothing left after flattening, are absent

use serde_json::Value;

const LIST_SEPARATOR: &str = ", ";
const PAIR_SEPARATOR: &str = "; ";

/// Flatten any JSON value into a string, or `None` when it carries no data
pub fn flatten_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_value).collect();
            non_empty(parts.join(LIST_SEPARATOR))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(k, v)| flatten_value(v).map(|v| format!("{}: {}", k, v)))
                .collect();
            non_empty(parts.join(PAIR_SEPARATOR))
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
