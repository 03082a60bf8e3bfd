//! Record abstraction read by the filter/sort pipeline.
//!
//! A list page never needs the full shape of its records; it needs an
//! identifier and a way to look up an attribute by field name. Pages that keep
//! records as raw JSON use the `serde_json::Value` implementation below.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::FilterValue;
use crate::id::RecordId;

/// A row of a remote collection.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    fn record_id(&self) -> RecordId;

    /// Look up an attribute by field name. Missing attributes return `None`.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Declared value type of a column; drives the sort comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Date,
}

/// Attribute value as seen by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl FieldValue {
    /// String form used for free-text search. `Null` is not searchable.
    pub fn search_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            FieldValue::Number(n) => Some(Cow::Owned(format_number(*n))),
            FieldValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            FieldValue::Null => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Parsed timestamp for date-like columns (RFC 3339, `YYYY-MM-DD HH:MM:SS`
    /// or a bare `YYYY-MM-DD`). Numbers are read as epoch milliseconds.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Text(s) => parse_timestamp(s.trim()),
            FieldValue::Number(n) => DateTime::from_timestamp_millis(*n as i64),
            _ => None,
        }
    }

    /// Exact-match equality used by field filters.
    ///
    /// Text filters compare against the string form of numbers and booleans
    /// so a `<select>` value of `"1"` matches a numeric attribute `1`.
    pub fn matches_exact(&self, filter: &FilterValue) -> bool {
        match (self, filter) {
            (FieldValue::Null, _) => false,
            (FieldValue::Number(n), FilterValue::Number(m)) => n == m,
            (FieldValue::Text(s), FilterValue::Number(m)) => {
                s.trim().parse::<f64>().is_ok_and(|n| n == *m)
            }
            (FieldValue::Bool(_), FilterValue::Number(_)) => false,
            (value, FilterValue::Text(t)) => value
                .search_text()
                .is_some_and(|s| s.as_ref() == t.as_str()),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Render integral numbers without a trailing `.0` so `"42"` matches `42`.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
            Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

/// Raw JSON rows, as returned by the REST resources.
///
/// Field names may be dotted paths (`"customer.name"`) into nested objects.
impl Record for Value {
    fn record_id(&self) -> RecordId {
        match self.get("id") {
            Some(Value::String(s)) => RecordId::new(s.clone()),
            Some(Value::Number(n)) => RecordId::new(n.to_string()),
            _ => RecordId::new(""),
        }
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let mut current = self;
        for segment in name.split('.') {
            current = current.get(segment)?;
        }
        Some(FieldValue::from(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_record_reads_nested_fields() {
        let row = json!({"id": 7, "customer": {"name": "Acme"}});
        assert_eq!(row.record_id(), RecordId::new("7"));
        assert_eq!(
            row.field("customer.name"),
            Some(FieldValue::Text("Acme".to_string()))
        );
        assert_eq!(row.field("customer.email"), None);
    }

    #[test]
    fn text_filter_matches_numeric_attribute() {
        let value = FieldValue::Number(42.0);
        assert!(value.matches_exact(&FilterValue::Text("42".to_string())));
        assert!(!value.matches_exact(&FilterValue::Text("42.5".to_string())));
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let value = FieldValue::Text("Active".to_string());
        assert!(value.matches_exact(&FilterValue::Text("Active".to_string())));
        assert!(!value.matches_exact(&FilterValue::Text("active".to_string())));
        assert!(!value.matches_exact(&FilterValue::Text("Inactive".to_string())));
    }

    #[test]
    fn date_like_text_parses_in_several_formats() {
        let rfc = FieldValue::Text("2024-03-01T10:00:00Z".to_string());
        let plain = FieldValue::Text("2024-03-01".to_string());
        let with_time = FieldValue::Text("2024-03-01 10:00:00".to_string());
        assert!(rfc.as_timestamp().is_some());
        assert_eq!(rfc.as_timestamp(), with_time.as_timestamp());
        assert!(plain.as_timestamp() < rfc.as_timestamp());
        assert_eq!(FieldValue::Text("soon".to_string()).as_timestamp(), None);
    }

    #[test]
    fn integral_numbers_search_without_fraction() {
        assert_eq!(FieldValue::Number(1200.0).search_text().unwrap(), "1200");
        assert_eq!(FieldValue::Number(12.5).search_text().unwrap(), "12.5");
    }
}
