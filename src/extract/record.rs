use super::schema::{FIELDS, SENTINEL, WEBSITE_URL};
use crate::parsers::text::{collapse_whitespace, is_blank};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Flat field name -> string mapping as it comes out of the model answer
pub type FieldMap = BTreeMap<String, String>;

/// The finished business facts for one site.
///
/// Every schema field is present with a non-empty value; anything the pipeline
/// could not determine holds [`SENTINEL`]. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessRecord {
    values: HashMap<&'static str, String>,
}

impl BusinessRecord {
    /// Fill every schema field from `extracted`, defaulting to the sentinel.
    ///
    /// Values are whitespace-collapsed, blank values count as missing and
    /// `website_url` is always the given seed URL regardless of what was extracted.
    pub fn complete(extracted: &FieldMap, website_url: &str) -> Self {
        let mut values = HashMap::with_capacity(FIELDS.len());
        for field in FIELDS {
            let value = extracted
                .get(field)
                .filter(|v| !is_blank(v))
                .map(|v| collapse_whitespace(v))
                .unwrap_or_else(|| SENTINEL.to_string());
            values.insert(field, value);
        }
        values.insert(WEBSITE_URL, website_or_sentinel(website_url));
        Self { values }
    }

    /// Degenerate record: nothing known except the site itself
    pub fn unavailable(website_url: &str) -> Self {
        Self::complete(&FieldMap::new(), website_url)
    }

    /// Value of a schema field; `None` only for names outside the schema
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Value of a field, or the sentinel for unknown names
    pub fn value(&self, field: &str) -> &str {
        self.get(field).unwrap_or(SENTINEL)
    }

    pub fn is_available(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| v != SENTINEL)
    }

    /// Fields other than `website_url` that hold real data
    pub fn available_count(&self) -> usize {
        FIELDS
            .iter()
            .filter(|f| **f != WEBSITE_URL && self.is_available(f))
            .count()
    }

    /// Fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        FIELDS.iter().map(|f| (*f, self.value(f)))
    }

    /// Plain copy of the mapping for consumers that want owned data
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

fn website_or_sentinel(website_url: &str) -> String {
    if is_blank(website_url) {
        SENTINEL.to_string()
    } else {
        website_url.trim().to_string()
    }
}

impl Serialize for BusinessRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELDS.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_every_field_present_and_non_empty() {
        let record = BusinessRecord::complete(&fields(&[("company_name", "Acme")]), "https://acme.test");
        for field in FIELDS {
            let value = record.get(field).unwrap();
            assert!(!value.is_empty(), "{} is empty", field);
        }
        assert_eq!(record.iter().count(), 32);
    }

    #[test]
    fn test_missing_and_blank_become_sentinel() {
        let record = BusinessRecord::complete(
            &fields(&[("email", ""), ("phone_number", "  \n ")]),
            "https://acme.test",
        );
        assert_eq!(record.value("email"), SENTINEL);
        assert_eq!(record.value("phone_number"), SENTINEL);
        assert_eq!(record.value("pricing"), SENTINEL);
        assert_eq!(record.value("timezone"), SENTINEL);
    }

    #[test]
    fn test_website_url_always_seed() {
        let record = BusinessRecord::complete(
            &fields(&[("website_url", "https://wrong.test")]),
            "https://acme.test/",
        );
        assert_eq!(record.value("website_url"), "https://acme.test/");
    }

    #[test]
    fn test_values_whitespace_collapsed() {
        let record = BusinessRecord::complete(
            &fields(&[("business_hours", "Mon-Fri\n  9am - 5pm ")]),
            "https://acme.test",
        );
        assert_eq!(record.value("business_hours"), "Mon-Fri 9am - 5pm");
    }

    #[test]
    fn test_extra_keys_dropped() {
        let record = BusinessRecord::complete(&fields(&[("favourite_colour", "blue")]), "https://acme.test");
        assert!(record.get("favourite_colour").is_none());
    }

    #[test]
    fn test_completion_is_idempotent() {
        let first = BusinessRecord::complete(
            &fields(&[("services_list", "Cuts,  Colour"), ("pricing", "$50, $75 package")]),
            "https://acme.test",
        );
        let second = BusinessRecord::complete(&first.to_map(), "https://acme.test");
        assert_eq!(first, second);
    }

    #[test]
    fn test_unavailable_record() {
        let record = BusinessRecord::unavailable("https://acme.test");
        assert_eq!(record.available_count(), 0);
        assert!(record.is_available("website_url"));
        assert!(
            record
                .iter()
                .filter(|(f, _)| *f != "website_url")
                .all(|(_, v)| v == SENTINEL)
        );
    }

    #[test]
    fn test_serializes_in_schema_order() {
        let record = BusinessRecord::unavailable("https://acme.test");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.starts_with(r#"{"company_name":"Not available","address""#));
        assert!(json.contains(r#""website_url":"https://acme.test""#));
    }
}
