//! The fixed business-information schema: which fields exist, how the model is
//! asked for them and how its sectioned answer is grouped.

/// Value stored for any field the pipeline could not determine
pub const SENTINEL: &str = "Not available";

/// Field that is always overwritten with the crawled seed URL
pub const WEBSITE_URL: &str = "website_url";

/// A field the model is asked to fill, with a hint on where to look
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub hint: &'static str,
}

/// A named group of fields; the model answers with one JSON object per section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

const fn field(name: &'static str, hint: &'static str) -> FieldSpec {
    FieldSpec { name, hint }
}

pub const SECTIONS: [Section; 7] = [
    Section {
        title: "Basic Info",
        fields: &[
            field("company_name", "Business or company name"),
            field("address", "Street address, city, state and ZIP"),
            field("phone_number", "Main phone number"),
            field(
                "email",
                "Email address (contact sections, mailto links, contact forms)",
            ),
            field(
                "business_hours",
                "Opening hours (\"hours\", \"open\", \"closed\", days of the week, schedules)",
            ),
            field(WEBSITE_URL, "Website URL"),
        ],
    },
    Section {
        title: "Services",
        fields: &[
            field("services_list", "Services offered, as a comma-separated string"),
            field("service_descriptions", "Short descriptions of the services"),
            field(
                "pricing",
                "Pricing information (dollar amounts, costs, fees, packages)",
            ),
            field(
                "duration",
                "Service or course duration (hours, days, weeks, course lengths)",
            ),
            field(
                "booking_links",
                "Online booking links (\"book online\", \"schedule\", \"appointment\", \"reserve\")",
            ),
            field(
                "service_areas",
                "Areas served (\"serving\", \"areas\", \"locations\", cities, regions)",
            ),
        ],
    },
    Section {
        title: "Payments & Policies",
        fields: &[
            field(
                "payment_methods",
                "Accepted payment methods (cards, cash, pay-later and financing providers)",
            ),
            field(
                "financing_plans",
                "Financing options (payment plans, tuition assistance, lenders)",
            ),
            field("refund_policy", "Refund or cancellation policy"),
        ],
    },
    Section {
        title: "Team",
        fields: &[
            field("staff_names", "Names of staff members"),
            field("staff_titles", "Job titles or roles of staff members"),
            field("staff_bios", "Short staff biographies"),
            field("staff_photos", "Links to staff photos"),
        ],
    },
    Section {
        title: "Social Media",
        fields: &[
            field("facebook_url", "Facebook page URL (facebook.com links)"),
            field("instagram_url", "Instagram profile URL (instagram.com links)"),
            field("linkedin_url", "LinkedIn page URL (linkedin.com links)"),
            field(
                "social_handles",
                "Other social profiles or handles (X/Twitter, TikTok, YouTube, Yelp)",
            ),
            field("promotions", "Current promotions, discounts or special offers"),
            field("testimonials", "Customer reviews or testimonials"),
        ],
    },
    Section {
        title: "Policies",
        fields: &[
            field(
                "privacy_policy",
                "Privacy policy (\"privacy policy\", \"privacy\", \"data protection\")",
            ),
            field(
                "terms_of_service",
                "Terms of service (\"terms\", \"terms of service\", \"terms of use\")",
            ),
            field("licenses_certifications", "Licenses and certifications"),
        ],
    },
    Section {
        title: "Branding",
        fields: &[
            field(
                "tagline",
                "Tagline or slogan (catchphrases, mottos, short memorable phrases)",
            ),
            field("mission_statement", "Mission statement"),
            field(
                "communication_style",
                "Tone of voice of the site (e.g. friendly, formal, playful)",
            ),
        ],
    },
];

/// Every field of a finished record, in display order.
///
/// `timezone` is never requested from the model and is always the sentinel.
pub const FIELDS: [&str; 32] = [
    "company_name",
    "address",
    "phone_number",
    "email",
    "website_url",
    "business_hours",
    "timezone",
    "services_list",
    "service_descriptions",
    "pricing",
    "duration",
    "booking_links",
    "service_areas",
    "payment_methods",
    "financing_plans",
    "refund_policy",
    "staff_names",
    "staff_titles",
    "staff_bios",
    "staff_photos",
    "facebook_url",
    "instagram_url",
    "linkedin_url",
    "social_handles",
    "promotions",
    "testimonials",
    "privacy_policy",
    "terms_of_service",
    "licenses_certifications",
    "tagline",
    "mission_statement",
    "communication_style",
];

/// Look up the static name of a schema field
pub fn field_name(name: &str) -> Option<&'static str> {
    FIELDS.iter().copied().find(|f| *f == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_section_fields_belong_to_schema() {
        for section in SECTIONS.iter() {
            for spec in section.fields {
                assert!(
                    field_name(spec.name).is_some(),
                    "{} is not a schema field",
                    spec.name
                );
            }
        }
    }

    #[test]
    fn test_only_timezone_is_unrequested() {
        let requested: HashSet<&str> = SECTIONS
            .iter()
            .flat_map(|s| s.fields.iter().map(|f| f.name))
            .collect();
        let unrequested: Vec<&str> = FIELDS
            .iter()
            .copied()
            .filter(|f| !requested.contains(f))
            .collect();
        assert_eq!(unrequested, vec!["timezone"]);
    }

    #[test]
    fn test_fields_unique() {
        let unique: HashSet<&str> = FIELDS.iter().copied().collect();
        assert_eq!(unique.len(), FIELDS.len());
    }
}
