//! Filter/sort/paginate pipeline.
//!
//! A pure function from `(items, filter state, page config)` to the rows a
//! page renders. It holds no state of its own, so there is nothing to
//! invalidate: callers re-run it whenever the authoritative list or the
//! filter state changes.

use std::collections::BTreeMap;

use adminlist_core::{FieldKind, Record};
use serde::{Deserialize, Serialize};

mod search;
mod sort;
pub mod state;

pub use state::{DEFAULT_PAGE_SIZE, FilterState, SortOrder, SortState};

use search::{SearchTerm, matches_fields};

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Per-page options for the search predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SearchOptions {
    pub debounce_ms: u64,
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            case_sensitive: false,
        }
    }
}

/// Static, per-page description of how records are searched and sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fields the free-text search looks into.
    pub search_fields: Vec<String>,
    /// Declared kind per sortable column; undeclared columns sort as text.
    pub columns: BTreeMap<String, FieldKind>,
    pub case_sensitive: bool,
}

impl PipelineConfig {
    pub fn new<I, S>(search_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_fields: search_fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn column(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.columns.insert(name.into(), kind);
        self
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn kind_of(&self, column: &str) -> FieldKind {
        self.columns.get(column).copied().unwrap_or_default()
    }
}

/// The rows of the current page plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSlice<R> {
    pub rows: Vec<R>,
    pub total_filtered: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<R> ViewSlice<R> {
    pub fn empty(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            total_filtered: 0,
            page: 0,
            page_size,
        }
    }

    pub fn page_count(&self) -> usize {
        self.total_filtered.div_ceil(self.page_size.max(1))
    }
}

/// Derive the visible slice. A page past the end yields no rows.
pub fn derive_view<R: Record>(
    items: &[R],
    filters: &FilterState,
    config: &PipelineConfig,
) -> ViewSlice<R> {
    let term = SearchTerm::new(filters.search_term(), config.case_sensitive);

    let mut matched: Vec<&R> = items
        .iter()
        .filter(|record| term.matches(*record, &config.search_fields))
        .filter(|record| matches_fields(*record, filters.fields()))
        .collect();

    if let Some(sort) = filters.sort() {
        sort::sort_rows(&mut matched, sort, config.kind_of(&sort.order_by));
    }

    let page_size = filters.page_size();
    let rows = matched
        .iter()
        .skip(filters.page().saturating_mul(page_size))
        .take(page_size)
        .map(|record| (*record).clone())
        .collect();

    ViewSlice {
        rows,
        total_filtered: matched.len(),
        page: filters.page(),
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adminlist_core::FilterValue;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    fn scenario_items() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Acme", "status": "Active"}),
            json!({"id": 2, "name": "Zed", "status": "Inactive"}),
        ]
    }

    #[test]
    fn search_then_field_filter_narrows_rows() {
        let config = PipelineConfig::new(["name", "status"]);
        let mut filters = FilterState::new(10);

        filters.set_search_term("a");
        let view = derive_view(&scenario_items(), &filters, &config);
        assert_eq!(view.total_filtered, 2);

        filters.set_field("status", Some(FilterValue::text("Active")));
        let view = derive_view(&scenario_items(), &filters, &config);
        assert_eq!(view.rows, vec![scenario_items()[0].clone()]);
    }

    #[test]
    fn pagination_slices_after_filtering_and_sorting() {
        let items: Vec<Value> = (1..=25)
            .map(|i| json!({"id": i, "name": format!("row {i:02}")}))
            .collect();
        let config = PipelineConfig::new(["name"]);
        let mut filters = FilterState::new(10).with_sort(SortState::ascending("name"));
        filters.set_page(2);

        let view = derive_view(&items, &filters, &config);

        assert_eq!(view.total_filtered, 25);
        assert_eq!(view.page_count(), 3);
        let ids: Vec<i64> = view.rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let config = PipelineConfig::new(["name"]);
        let mut filters = FilterState::new(10);
        filters.set_page(5);

        let view = derive_view(&scenario_items(), &filters, &config);

        assert!(view.rows.is_empty());
        assert_eq!(view.total_filtered, 2);
    }

    #[test]
    fn undeclared_columns_sort_as_text() {
        let config = PipelineConfig::new(["name"]).column("amount", FieldKind::Number);
        assert_eq!(config.kind_of("amount"), FieldKind::Number);
        assert_eq!(config.kind_of("name"), FieldKind::Text);
    }

    fn record_strategy() -> impl Strategy<Value = Value> {
        (
            0u32..1000,
            "[a-cA-C]{0,4}",
            prop::sample::select(vec!["Active", "Inactive", "Pending"]),
            0i64..50,
        )
            .prop_map(|(id, name, status, amount)| {
                json!({"id": id, "name": name, "status": status, "amount": amount})
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// A record is visible iff it matches the search, every set field
        /// filter, and falls inside the page window.
        #[test]
        fn visible_rows_are_exactly_the_matching_page(
            items in prop::collection::vec(record_strategy(), 0..40),
            term in "[a-c]{0,2}",
            status in prop::option::of(prop::sample::select(vec!["Active", "Inactive"])),
            page in 0usize..4,
            page_size in 1usize..8,
        ) {
            let config = PipelineConfig::new(["name", "status"]);
            let mut filters = FilterState::new(page_size);
            filters.set_search_term(term.clone());
            filters.set_field("status", status.map(FilterValue::from));
            filters.set_page(page);

            let view = derive_view(&items, &filters, &config);

            let needle = term.to_lowercase();
            let expected: Vec<Value> = items
                .iter()
                .filter(|r| {
                    needle.is_empty()
                        || r["name"].as_str().unwrap().to_lowercase().contains(&needle)
                        || r["status"].as_str().unwrap().to_lowercase().contains(&needle)
                })
                .filter(|r| status.is_none_or(|s| r["status"] == s))
                .cloned()
                .collect();

            prop_assert_eq!(view.total_filtered, expected.len());
            let window: Vec<Value> = expected
                .into_iter()
                .skip(page * page_size)
                .take(page_size)
                .collect();
            prop_assert_eq!(view.rows, window);
        }

        #[test]
        fn sorting_twice_gives_identical_output(
            items in prop::collection::vec(record_strategy(), 0..40),
            column in prop::sample::select(vec!["name", "amount", "status"]),
            descending in any::<bool>(),
        ) {
            let config = PipelineConfig::new(["name"]).column("amount", FieldKind::Number);
            let mut filters = FilterState::new(100).with_sort(SortState {
                order_by: column.to_string(),
                order: if descending { SortOrder::Descending } else { SortOrder::Ascending },
            });

            let first = derive_view(&items, &filters, &config);
            filters.set_page(0);
            let second = derive_view(&items, &filters, &config);

            prop_assert_eq!(first, second);
        }
    }
}
