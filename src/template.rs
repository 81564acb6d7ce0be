//! Filling a prompt template with the fields of a [`BusinessRecord`].
//!
//! Every schema field can be referenced as `{{field_name}}`. A handful of
//! shorter alias tokens are accepted as well. Replacement is literal.

use crate::error::TemplateError;
use crate::extract::{BusinessRecord, FIELDS};
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_TEMPLATE_PATH: &str = "prompt_template.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "final_prompt.txt";

/// Alias token -> schema field
const ALIASES: [(&str, &str); 13] = [
    ("{{website}}", "website_url"),
    ("{{services}}", "services_list"),
    ("{{financing}}", "financing_plans"),
    ("{{team}}", "staff_names"),
    ("{{bios}}", "staff_titles"),
    ("{{team_photos}}", "staff_photos"),
    ("{{facebook}}", "facebook_url"),
    ("{{instagram}}", "instagram_url"),
    ("{{linkedin}}", "linkedin_url"),
    ("{{other_socials}}", "social_handles"),
    ("{{terms}}", "terms_of_service"),
    ("{{licenses}}", "licenses_certifications"),
    ("{{tone}}", "communication_style"),
];

/// All recognised tokens with the field each one reads
pub fn placeholders() -> Vec<(String, &'static str)> {
    ALIASES
        .iter()
        .map(|(token, field)| (token.to_string(), *field))
        .chain(FIELDS.iter().map(|field| (format!("{{{{{}}}}}", field), *field)))
        .collect()
}

/// Replace every known token in `template` with the record's value
pub fn render(template: &str, record: &BusinessRecord) -> String {
    placeholders()
        .iter()
        .fold(template.to_string(), |text, (token, field)| {
            if text.contains(token.as_str()) {
                text.replace(token.as_str(), record.value(field))
            } else {
                text
            }
        })
}

pub fn load_template<P: AsRef<Path>>(path: P) -> Result<String, TemplateError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TemplateError::Missing(path.display().to_string()),
        _ => TemplateError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{FieldMap, SENTINEL};

    fn record() -> BusinessRecord {
        let mut fields = FieldMap::new();
        fields.insert("company_name".into(), "Acme Plumbing".into());
        fields.insert("services_list".into(), "Repairs, Installs".into());
        fields.insert("staff_names".into(), "Ana, Ben".into());
        fields.insert("staff_photos".into(), "https://acme.test/ana.jpg".into());
        fields.insert("communication_style".into(), "friendly".into());
        fields.insert("facebook_url".into(), "https://facebook.com/acme".into());
        fields.insert("instagram_url".into(), "https://instagram.com/acme".into());
        fields.insert("linkedin_url".into(), "https://linkedin.com/company/acme".into());
        BusinessRecord::complete(&fields, "https://acme.test")
    }

    #[test]
    fn test_direct_tokens() {
        let out = render("Welcome to {{company_name}} at {{website_url}}.", &record());
        assert_eq!(out, "Welcome to Acme Plumbing at https://acme.test.");
    }

    #[test]
    fn test_alias_tokens() {
        let out = render(
            "{{website}} | {{services}} | {{team}} | {{team_photos}} | {{tone}}",
            &record(),
        );
        assert_eq!(
            out,
            "https://acme.test | Repairs, Installs | Ana, Ben | https://acme.test/ana.jpg | friendly"
        );
    }

    #[test]
    fn test_social_alias_tokens() {
        let out = render("FB={{facebook}} IG={{instagram}} LI={{linkedin}}", &record());
        assert_eq!(
            out,
            "FB=https://facebook.com/acme IG=https://instagram.com/acme \
             LI=https://linkedin.com/company/acme"
        );
    }

    #[test]
    fn test_missing_fields_render_sentinel() {
        let out = render("Call {{phone_number}} ({{timezone}})", &record());
        assert_eq!(out, format!("Call {} ({})", SENTINEL, SENTINEL));
    }

    #[test]
    fn test_unknown_tokens_left_alone() {
        let out = render("{{favourite_colour}} {company_name}", &record());
        assert_eq!(out, "{{favourite_colour}} {company_name}");
    }

    #[test]
    fn test_repeated_token() {
        let out = render("{{company_name}}/{{company_name}}", &record());
        assert_eq!(out, "Acme Plumbing/Acme Plumbing");
    }

    #[test]
    fn test_every_field_has_a_token() {
        let tokens = placeholders();
        for field in FIELDS {
            assert!(tokens.iter().any(|(t, f)| *f == field && t == &format!("{{{{{}}}}}", field)));
        }
    }

    #[test]
    fn test_missing_template_file() {
        let err = load_template("/nonexistent/prompt_template.txt").unwrap_err();
        assert!(matches!(err, TemplateError::Missing(p) if p.ends_with("prompt_template.txt")));
    }
}
