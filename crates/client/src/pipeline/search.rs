//! Record predicates: free-text search and field filters.

use adminlist_core::{FilterValues, Record};

/// Search term normalized once per derivation.
#[derive(Debug, Clone)]
pub(crate) struct SearchTerm {
    needle: Option<String>,
    case_sensitive: bool,
}

impl SearchTerm {
    pub(crate) fn new(raw: &str, case_sensitive: bool) -> Self {
        let trimmed = raw.trim();
        let needle = if trimmed.is_empty() {
            None
        } else if case_sensitive {
            Some(trimmed.to_string())
        } else {
            Some(trimmed.to_lowercase())
        };
        Self {
            needle,
            case_sensitive,
        }
    }

    /// A record matches if any search field contains the term. Blank terms
    /// match everything.
    pub(crate) fn matches<R: Record>(&self, record: &R, fields: &[String]) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };
        fields.iter().any(|name| {
            record
                .field(name)
                .and_then(|value| {
                    value.search_text().map(|text| {
                        if self.case_sensitive {
                            text.contains(needle.as_str())
                        } else {
                            text.to_lowercase().contains(needle.as_str())
                        }
                    })
                })
                .unwrap_or(false)
        })
    }
}

/// Every set field filter must match exactly.
pub(crate) fn matches_fields<R: Record>(record: &R, filters: &FilterValues) -> bool {
    filters
        .iter()
        .filter(|(_, value)| !value.is_unset())
        .all(|(name, value)| {
            record
                .field(name)
                .is_some_and(|field| field.matches_exact(value))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adminlist_core::FilterValue;
    use serde_json::json;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn search_is_case_insensitive_by_default() {
        let row = json!({"name": "Acme Corp"});
        assert!(SearchTerm::new("ACME", false).matches(&row, &fields(&["name"])));
        assert!(!SearchTerm::new("ACME", true).matches(&row, &fields(&["name"])));
    }

    #[test]
    fn blank_term_matches_everything() {
        let row = json!({"name": "Zed"});
        assert!(SearchTerm::new("   ", false).matches(&row, &fields(&["name"])));
    }

    #[test]
    fn only_configured_fields_are_searched() {
        let row = json!({"name": "Zed", "notes": "acme supplier"});
        assert!(!SearchTerm::new("acme", false).matches(&row, &fields(&["name"])));
        assert!(SearchTerm::new("acme", false).matches(&row, &fields(&["name", "notes"])));
    }

    #[test]
    fn numbers_are_searchable_as_text() {
        let row = json!({"phone": 5550123});
        assert!(SearchTerm::new("0123", false).matches(&row, &fields(&["phone"])));
    }

    #[test]
    fn field_filters_are_anded() {
        let row = json!({"status": "Active", "city": "Oslo"});
        let mut filters = FilterValues::new();
        filters.insert("status".into(), FilterValue::text("Active"));
        assert!(matches_fields(&row, &filters));

        filters.insert("city".into(), FilterValue::text("Bergen"));
        assert!(!matches_fields(&row, &filters));
    }

    #[test]
    fn missing_attribute_never_matches_a_set_filter() {
        let row = json!({"name": "Acme"});
        let mut filters = FilterValues::new();
        filters.insert("status".into(), FilterValue::text("Active"));
        assert!(!matches_fields(&row, &filters));
    }
}
