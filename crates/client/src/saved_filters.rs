//! Saved filter presets, per `(page, user)` bucket.
//!
//! A bucket holds at most [`MAX_SAVED_FILTERS`] presets, newest first. Saving
//! an empty or duplicate preset is rejected without side effects; the UI
//! renders the rejection as a disabled "Save Filter" control. Applying a
//! preset never touches a page's state directly: the registry publishes an
//! [`ApplySavedFilter`] message and every mounted page for that key merges it.

use std::sync::Arc;

use adminlist_core::{
    FilterField, FilterId, FilterValues, PageKey, SaveRejection, SavedFilterError, StorageError,
    UserId, active_values,
};
use adminlist_events::{ApplySavedFilter, EventChannel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

pub const MAX_SAVED_FILTERS: usize = 3;
pub const MAX_NAME_CHARS: usize = 50;
const FALLBACK_NAME: &str = "Filter";
const NAMESPACE: &str = "saved_filters";

/// A stored preset. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub id: FilterId,
    pub name: String,
    pub values: FilterValues,
    pub timestamp: DateTime<Utc>,
}

/// Whether "Save Filter" is enabled, and why not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveAvailability {
    Enabled,
    Disabled(SaveRejection),
}

impl SaveAvailability {
    pub fn is_enabled(&self) -> bool {
        matches!(self, SaveAvailability::Enabled)
    }

    /// Tooltip text for a disabled control.
    pub fn reason(&self) -> Option<String> {
        match self {
            SaveAvailability::Enabled => None,
            SaveAvailability::Disabled(rejection) => Some(rejection.to_string()),
        }
    }
}

/// Name from the set fields: `"Status: Active, City: Oslo"`, capped at
/// [`MAX_NAME_CHARS`] characters.
pub fn preset_name(fields: &[FilterField]) -> String {
    let parts: Vec<String> = fields
        .iter()
        .filter_map(|f| f.active_value().map(|v| format!("{}: {}", f.label, v)))
        .collect();
    if parts.is_empty() {
        return FALLBACK_NAME.to_string();
    }
    parts.join(", ").chars().take(MAX_NAME_CHARS).collect()
}

pub struct SavedFilterRegistry<S, C> {
    store: Arc<S>,
    channel: C,
}

impl<S, C> SavedFilterRegistry<S, C>
where
    S: KeyValueStore,
    C: EventChannel<ApplySavedFilter>,
{
    pub fn new(store: Arc<S>, channel: C) -> Self {
        Self { store, channel }
    }

    /// Presets of the bucket, newest first. A corrupt bucket reads as empty.
    pub async fn list(&self, page: &PageKey, user: UserId) -> Result<Vec<SavedFilter>, StorageError> {
        let key = bucket_key(page, user);
        let Some(entry) = self.store.get(NAMESPACE, &key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&entry.value) {
            Ok(filters) => Ok(filters),
            Err(err) => {
                tracing::warn!(bucket = %key, "ignoring corrupt saved-filter bucket: {err}");
                Ok(Vec::new())
            }
        }
    }

    pub async fn save_availability(
        &self,
        page: &PageKey,
        user: UserId,
        fields: &[FilterField],
    ) -> Result<SaveAvailability, StorageError> {
        let existing = self.list(page, user).await?;
        Ok(match check_save(&existing, &active_values(fields)) {
            Ok(()) => SaveAvailability::Enabled,
            Err(rejection) => SaveAvailability::Disabled(rejection),
        })
    }

    /// Save the set fields as a new preset, evicting the oldest beyond the cap.
    pub async fn save(
        &self,
        page: &PageKey,
        user: UserId,
        fields: &[FilterField],
    ) -> Result<SavedFilter, SavedFilterError> {
        let existing = self.list(page, user).await?;
        let values = active_values(fields);
        check_save(&existing, &values)?;

        let preset = SavedFilter {
            id: FilterId::new(),
            name: preset_name(fields),
            values,
            timestamp: Utc::now(),
        };

        let mut updated = Vec::with_capacity(MAX_SAVED_FILTERS);
        updated.push(preset.clone());
        updated.extend(existing);
        if updated.len() > MAX_SAVED_FILTERS {
            let evicted: Vec<_> = updated.drain(MAX_SAVED_FILTERS..).map(|f| f.id).collect();
            tracing::debug!(page = %page, ?evicted, "evicting oldest saved filters");
        }

        self.write(page, user, &updated).await?;
        tracing::info!(page = %page, filter_id = %preset.id, name = %preset.name, "saved filter");
        Ok(preset)
    }

    /// Remove a preset. Returns whether anything was removed.
    pub async fn delete(
        &self,
        page: &PageKey,
        user: UserId,
        filter_id: FilterId,
    ) -> Result<bool, StorageError> {
        let mut filters = self.list(page, user).await?;
        let before = filters.len();
        filters.retain(|f| f.id != filter_id);
        if filters.len() == before {
            return Ok(false);
        }
        self.write(page, user, &filters).await?;
        tracing::info!(page = %page, filter_id = %filter_id, "deleted saved filter");
        Ok(true)
    }

    /// Publish the preset's values to every page mounted under `page`.
    ///
    /// Returns `false` (and publishes nothing) when the preset does not exist.
    pub async fn apply(
        &self,
        page: &PageKey,
        user: UserId,
        filter_id: FilterId,
    ) -> Result<bool, SavedFilterError> {
        let filters = self.list(page, user).await?;
        let Some(preset) = filters.into_iter().find(|f| f.id == filter_id) else {
            return Ok(false);
        };

        self.channel
            .publish(ApplySavedFilter {
                page_key: page.clone(),
                filter_id,
                values: preset.values,
            })
            .map_err(|e| SavedFilterError::Publish(format!("{e:?}")))?;
        tracing::debug!(page = %page, filter_id = %filter_id, event = ApplySavedFilter::NAME, "published");
        Ok(true)
    }

    async fn write(
        &self,
        page: &PageKey,
        user: UserId,
        filters: &[SavedFilter],
    ) -> Result<(), StorageError> {
        let payload =
            serde_json::to_string(filters).map_err(|e| StorageError::Encode(e.to_string()))?;
        self.store.put(NAMESPACE, &bucket_key(page, user), payload).await
    }
}

fn bucket_key(page: &PageKey, user: UserId) -> String {
    format!("{page}:{user}")
}

fn check_save(existing: &[SavedFilter], values: &FilterValues) -> Result<(), SaveRejection> {
    if values.is_empty() {
        return Err(SaveRejection::NoActiveFields);
    }
    match existing.iter().find(|f| &f.values == values) {
        Some(duplicate) => Err(SaveRejection::Duplicate {
            existing: duplicate.id,
        }),
        None => Ok(()),
    }
}
