//! Prompt templates for the description and the three extraction calls.

use scout_shared::NO_CONTEXT;

/// The three facts pulled out of the encyclopedia context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    KeyPeople,
    ProductsServices,
    Locations,
}

impl Extraction {
    pub const ALL: [Extraction; 3] = [Self::KeyPeople, Self::ProductsServices, Self::Locations];

    /// Report field this extraction fills.
    pub fn field(&self) -> &'static str {
        match self {
            Self::KeyPeople => "key_people",
            Self::ProductsServices => "products_services",
            Self::Locations => "locations",
        }
    }

    fn instruction(&self, company: &str) -> String {
        match self {
            Self::KeyPeople => {
                format!("list the key people (founders, CEO, leadership) of {company}")
            }
            Self::ProductsServices => {
                format!("summarize the main products or services offered by {company}")
            }
            Self::Locations => {
                format!("describe the global presence or headquarters locations of {company}")
            }
        }
    }
}

/// Prompt for the short company description.
///
/// `context` and `website` are left out (or replaced by the no-context
/// marker) when absent; slicing the context is the caller's job.
pub fn describe(company: &str, context: Option<&str>, website: Option<&str>) -> String {
    let mut prompt =
        format!("In one short paragraph (max 3 sentences), describe {company}.\n");
    if let Some(website) = website.filter(|w| !w.is_empty()) {
        prompt.push_str(&format!("Website: {website}\n"));
    }
    let context = context.filter(|c| !c.is_empty()).unwrap_or(NO_CONTEXT);
    prompt.push_str(&format!("Context: {context}"));
    prompt
}

/// Prompt for one extraction call over an already-sliced context.
pub fn extract(kind: Extraction, company: &str, context: &str) -> String {
    format!(
        "From the following context, {}:\n{context}",
        kind.instruction(company)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_with_everything() {
        let prompt = describe("Acme Co", Some("Acme is a company."), Some("https://www.acmeco.com"));
        assert_eq!(
            prompt,
            "In one short paragraph (max 3 sentences), describe Acme Co.\n\
             Website: https://www.acmeco.com\n\
             Context: Acme is a company."
        );
    }

    #[test]
    fn describe_without_website_or_context() {
        let prompt = describe("Acme Co", None, Some(""));
        assert!(!prompt.contains("Website:"));
        assert!(prompt.ends_with("Context: No context available"));
    }

    #[test]
    fn extraction_prompts_name_the_company() {
        for kind in Extraction::ALL {
            let prompt = extract(kind, "Acme Co", "ctx");
            assert!(prompt.starts_with("From the following context, "));
            assert!(prompt.contains("Acme Co"));
            assert!(prompt.ends_with(":\nctx"));
        }
        assert!(extract(Extraction::KeyPeople, "Acme", "").contains("founders, CEO"));
    }

    #[test]
    fn extraction_fields() {
        let fields: Vec<_> = Extraction::ALL.iter().map(Extraction::field).collect();
        assert_eq!(fields, vec!["key_people", "products_services", "locations"]);
    }
}
