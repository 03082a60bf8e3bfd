//! Messages exchanged between the saved-filter registry and list pages.

use adminlist_core::{FilterId, FilterValues, PageKey};
use serde::{Deserialize, Serialize};

/// "Apply this preset" request.
///
/// Published by the registry; every mounted list page whose key equals
/// `page_key` merges `values` into its own field filters. Other pages ignore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySavedFilter {
    pub page_key: PageKey,
    pub filter_id: FilterId,
    pub values: FilterValues,
}

impl ApplySavedFilter {
    /// Wire name of the event.
    pub const NAME: &'static str = "applySavedFilter";

    pub fn is_for(&self, page_key: &PageKey) -> bool {
        &self.page_key == page_key
    }
}
