//! User-controlled filter, sort and page state of one list page.
//!
//! Every mutator that changes which rows match, or their order, resets the
//! page to 0 so the user never lands on an empty page past the new end.

use adminlist_core::{FilterValue, FilterValues};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// The single active sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub order_by: String,
    pub order: SortOrder,
}

impl SortState {
    pub fn ascending(order_by: impl Into<String>) -> Self {
        Self {
            order_by: order_by.into(),
            order: SortOrder::Ascending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Settled (debounced) search term.
    search_term: String,
    fields: FilterValues,
    sort: Option<SortState>,
    page: usize,
    page_size: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FilterState {
    pub fn new(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            fields: FilterValues::new(),
            sort: None,
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn fields(&self) -> &FilterValues {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FilterValue> {
        self.fields.get(name)
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns whether the term changed.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if term == self.search_term {
            return false;
        }
        self.search_term = term;
        self.page = 0;
        true
    }

    /// Set or clear one field filter. Unset values remove the constraint.
    pub fn set_field(&mut self, name: impl Into<String>, value: Option<FilterValue>) {
        let name = name.into();
        match value.filter(|v| !v.is_unset()) {
            Some(value) => {
                self.fields.insert(name, value);
            }
            None => {
                self.fields.remove(&name);
            }
        }
        self.page = 0;
    }

    /// Merge preset values over the current field filters.
    pub fn merge_fields(&mut self, values: &FilterValues) {
        for (name, value) in values {
            self.set_field(name.clone(), Some(value.clone()));
        }
        self.page = 0;
    }

    pub fn clear_fields(&mut self) {
        self.fields.clear();
        self.page = 0;
    }

    /// Select a sort column: the active column toggles direction, any other
    /// column becomes active in ascending order.
    pub fn sort_by(&mut self, field: impl Into<String>) {
        let field = field.into();
        self.sort = Some(match self.sort.take() {
            Some(current) if current.order_by == field => SortState {
                order_by: field,
                order: current.order.toggled(),
            },
            _ => SortState::ascending(field),
        });
        self.page = 0;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 0;
    }
}
