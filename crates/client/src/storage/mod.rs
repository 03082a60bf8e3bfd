//! Durable key/value storage shared by the cache and saved filters.
//!
//! Values are opaque JSON strings grouped by namespace; callers own the
//! encoding. Writes replace the previous value wholesale.

use std::sync::Arc;

use adminlist_core::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A stored value and the time it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub value: String,
    pub saved_at: DateTime<Utc>,
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredEntry>, StorageError>;

    /// Replace the value under `(namespace, key)`.
    async fn put(&self, namespace: &str, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove the value; removing a missing key is not an error.
    async fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredEntry>, StorageError> {
        (**self).get(namespace, key).await
    }

    async fn put(&self, namespace: &str, key: &str, value: String) -> Result<(), StorageError> {
        (**self).put(namespace, key, value).await
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        (**self).remove(namespace, key).await
    }
}
