//! Field-filter values and definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::format_number;

/// Value selected for a field filter: a string or a number.
///
/// An empty (or blank) string means "unset" and imposes no constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_unset(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.trim().is_empty(),
            FilterValue::Number(n) => n.is_nan(),
        }
    }
}

impl core::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FilterValue::Text(s) => f.write_str(s),
            FilterValue::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

/// Field name → selected value. Ordered so equal sets compare and serialize equal.
pub type FilterValues = BTreeMap<String, FilterValue>;

/// One field filter of a page, with its current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// Stable identifier, unique within the page's filter set.
    pub name: String,
    /// Display only.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

impl FilterField {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<FilterValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// The value, if one is set and non-empty.
    pub fn active_value(&self) -> Option<&FilterValue> {
        self.value.as_ref().filter(|v| !v.is_unset())
    }
}

/// Collect the non-empty values of `fields`, keyed by field name.
pub fn active_values(fields: &[FilterField]) -> FilterValues {
    fields
        .iter()
        .filter_map(|f| f.active_value().map(|v| (f.name.clone(), v.clone())))
        .collect()
}
