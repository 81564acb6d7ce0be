//! Schema-constrained extraction of business facts from crawled text.

pub mod extractor;
pub mod record;
pub mod schema;
pub mod value;

pub use extractor::{SchemaExtractor, build_prompt, build_request, parse_response};
pub use record::{BusinessRecord, FieldMap};
pub use schema::{FIELDS, SECTIONS, SENTINEL};
