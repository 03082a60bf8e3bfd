//! Last-known-good snapshot per entity collection (offline fallback).
//!
//! One snapshot per key, overwritten wholesale on each successful fetch.
//! There is no expiry: on the fallback path a stale list beats no list.

use std::marker::PhantomData;
use std::sync::Arc;

use adminlist_core::{Record, StorageError};
use chrono::{DateTime, Utc};

use crate::storage::KeyValueStore;

const NAMESPACE: &str = "cache";

/// A cached collection and the time it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot<R> {
    pub key: String,
    pub items: Vec<R>,
    pub saved_at: DateTime<Utc>,
}

/// Typed view over the durable store for one record type.
#[derive(Debug)]
pub struct CacheStore<R, S> {
    store: Arc<S>,
    _record: PhantomData<fn() -> R>,
}

impl<R, S> Clone for CacheStore<R, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<R, S> CacheStore<R, S>
where
    R: Record,
    S: KeyValueStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Replace the snapshot under `key`. Last writer wins.
    pub async fn write(&self, key: &str, items: &[R]) -> Result<(), StorageError> {
        let payload =
            serde_json::to_string(items).map_err(|e| StorageError::Encode(e.to_string()))?;
        self.store.put(NAMESPACE, key, payload).await?;
        tracing::debug!(cache_key = key, items = items.len(), "cache snapshot written");
        Ok(())
    }

    /// Read the snapshot under `key`.
    ///
    /// Never-written keys, unreadable storage and corrupt payloads all read as
    /// `None`; the caller is on a fallback path and cannot do better.
    pub async fn read(&self, key: &str) -> Option<CacheSnapshot<R>> {
        let entry = match self.store.get(NAMESPACE, key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                tracing::error!(cache_key = key, "failed to read cache snapshot: {err}");
                return None;
            }
        };

        match serde_json::from_str::<Vec<R>>(&entry.value) {
            Ok(items) => Some(CacheSnapshot {
                key: key.to_string(),
                items,
                saved_at: entry.saved_at,
            }),
            Err(err) => {
                tracing::warn!(cache_key = key, "ignoring corrupt cache snapshot: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::{Value, json};

    fn cache() -> (Arc<MemoryStore>, CacheStore<Value, MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let cache = CacheStore::new(Arc::clone(&store));
        (store, cache)
    }

    #[tokio::test]
    async fn read_of_unwritten_key_is_none() {
        let (_, cache) = cache();
        assert!(cache.read("customers").await.is_none());
    }

    #[tokio::test]
    async fn write_replaces_previous_snapshot_wholesale() {
        let (_, cache) = cache();
        cache
            .write("customers", &[json!({"id": 1}), json!({"id": 2})])
            .await
            .unwrap();
        cache.write("customers", &[json!({"id": 3})]).await.unwrap();

        let snapshot = cache.read("customers").await.unwrap();
        assert_eq!(snapshot.key, "customers");
        assert_eq!(snapshot.items, vec![json!({"id": 3})]);
    }

    #[tokio::test]
    async fn corrupt_payload_reads_as_absent() {
        let (store, cache) = cache();
        store
            .put(NAMESPACE, "taxes", "{not json".to_string())
            .await
            .unwrap();

        assert!(cache.read("taxes").await.is_none());
    }

    #[tokio::test]
    async fn payload_of_wrong_shape_reads_as_absent() {
        let (store, cache) = cache();
        store
            .put(NAMESPACE, "taxes", r#"{"data": []}"#.to_string())
            .await
            .unwrap();

        assert!(cache.read("taxes").await.is_none());
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (_, cache) = cache();
        cache.write("companies", &[json!({"id": "c1"})]).await.unwrap();

        assert!(cache.read("customers").await.is_none());
        assert_eq!(cache.read("companies").await.unwrap().items.len(), 1);
    }
}
