//! Core domain types for scout reports.

use serde::{Deserialize, Serialize};

/// Summary text used when the generation backend fails on the description.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable";

/// Text used when a single extraction call fails.
pub const INFORMATION_UNAVAILABLE: &str = "Information unavailable";

/// Text used for every extracted field when there is no encyclopedia context.
pub const NO_CONTEXT: &str = "No context available";

// ---------------------------------------------------------------------------
// CompanyReport
// ---------------------------------------------------------------------------

/// The result of one research run for one company.
///
/// Every field is always present. Missing data is a sentinel string or an
/// empty value, never an absent key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyReport {
    /// The name the run was started with, echoed verbatim.
    pub company_name: String,
    /// Best-effort official website, empty when none was resolved.
    pub website: String,
    /// Short generated description.
    pub summary: String,
    /// Founders, executives, leadership.
    pub key_people: String,
    /// Main products or services.
    pub products_services: String,
    /// Headquarters and global presence.
    pub locations: String,
    /// Headline titles in feed order.
    pub recent_news: Vec<String>,
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Outcome of a single best-effort lookup.
///
/// Separates "the source answered with nothing" from "the source could not
/// be reached or made no sense", which a plain empty value cannot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The source returned usable data.
    Found(T),
    /// The source answered but had nothing for this query.
    Empty,
    /// The request or response handling failed.
    Failed(String),
}

impl<T> Lookup<T> {
    /// The found value, if any.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Empty | Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The found value or the type's default (empty string, empty list).
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.found().unwrap_or_default()
    }
}

impl<T, E: std::fmt::Display> From<std::result::Result<Option<T>, E>> for Lookup<T> {
    fn from(result: std::result::Result<Option<T>, E>) -> Self {
        match result {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) => Self::Empty,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Return at most `max_chars` characters of `text`, never splitting a
/// UTF-8 code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> CompanyReport {
        CompanyReport {
            company_name: "Acme Co".into(),
            website: "https://www.acmeco.com".into(),
            summary: "Acme makes everything.".into(),
            key_people: "Wile E. Coyote (customer)".into(),
            products_services: "Anvils, rockets".into(),
            locations: "Desert Southwest".into(),
            recent_news: vec!["Acme recalls rocket skates".into()],
        }
    }

    #[test]
    fn report_serializes_every_field() {
        let mut report = sample_report();
        report.website = String::new();
        report.recent_news.clear();

        let value = serde_json::to_value(&report).expect("serialize");
        let object = value.as_object().expect("object");
        for key in [
            "company_name",
            "website",
            "summary",
            "key_people",
            "products_services",
            "locations",
            "recent_news",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object.len(), 7);
        assert_eq!(object["website"], "");
        assert_eq!(object["recent_news"], serde_json::json!([]));
    }

    #[test]
    fn report_roundtrip() {
        let report = sample_report();
        let json = serde_json::to_string_pretty(&report).expect("serialize");
        let parsed: CompanyReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, report);
    }

    #[test]
    fn lookup_from_result() {
        let found: Lookup<String> = Ok::<_, std::fmt::Error>(Some("x".to_string())).into();
        assert_eq!(found, Lookup::Found("x".to_string()));

        let empty: Lookup<String> = Ok::<_, std::fmt::Error>(None).into();
        assert_eq!(empty, Lookup::Empty);

        let failed: Lookup<String> = Err::<Option<String>, _>(std::fmt::Error).into();
        assert!(failed.is_failed());
    }

    #[test]
    fn lookup_accessors() {
        assert_eq!(Lookup::Found(3).found(), Some(3));
        assert_eq!(Lookup::<u8>::Empty.found(), None);
        assert_eq!(Lookup::<String>::Failed("timeout".into()).unwrap_or_default(), "");
        assert!(!Lookup::<u8>::Empty.is_failed());
    }

    #[test]
    fn truncate_chars_respects_budget() {
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn truncate_chars_counts_code_points() {
        let text = "Nestlé S.A. – Société";
        let cut = truncate_chars(text, 6);
        assert_eq!(cut, "Nestlé");
        assert_eq!(cut.chars().count(), 6);
    }
}
