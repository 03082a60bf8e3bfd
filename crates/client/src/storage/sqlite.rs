//! SQLite-backed durable storage (survives restarts).

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use adminlist_core::StorageError;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use super::{KeyValueStore, StoredEntry};

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// SQLite key/value store, lazily opened on first use.
///
/// Cheap to clone; clones share the same pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    location: Location,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteStore {
    /// Store at `{app_data_dir}/adminlist/store.db`.
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::at_path(default_db_path()?))
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Private in-memory database; contents vanish with the store.
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            pool: Arc::new(Mutex::new(None)),
        }
    }

    async fn connect(&self) -> anyhow::Result<SqlitePool> {
        let pool = match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create storage directory at {:?}", parent)
                    })?;
                }
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);
                SqlitePoolOptions::new()
                    .connect_with(options)
                    .await
                    .with_context(|| format!("failed to open SQLite store at {:?}", path))?
            }
            Location::Memory => {
                // A single connection that never idles out, or the database is lost.
                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .context("invalid in-memory SQLite URL")?;
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
                    .context("failed to open in-memory SQLite store")?
            }
        };

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                namespace  TEXT NOT NULL,
                key        TEXT NOT NULL,
                value      TEXT NOT NULL,
                saved_at   TEXT NOT NULL,
                PRIMARY KEY (namespace, key)
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create kv_entries table")?;

        Ok(pool)
    }

    /// Get the pool, opening the database if necessary.
    async fn pool(&self) -> anyhow::Result<SqlitePool> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }
        let pool = self.connect().await?;
        *guard = Some(pool.clone());
        Ok(pool)
    }

    async fn try_get(&self, namespace: &str, key: &str) -> anyhow::Result<Option<StoredEntry>> {
        let pool = self.pool().await?;

        let row = sqlx::query(
            r#"
            SELECT value, saved_at
            FROM kv_entries
            WHERE namespace = ?1
              AND key = ?2
            "#,
        )
        .bind(namespace)
        .bind(key)
        .fetch_optional(&pool)
        .await
        .context("failed to read kv entry")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row.try_get("value")?;
        let saved_at_str: String = row.try_get("saved_at")?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .context("invalid saved_at timestamp in kv_entries")?;

        Ok(Some(StoredEntry { value, saved_at }))
    }

    async fn try_put(&self, namespace: &str, key: &str, value: &str) -> anyhow::Result<()> {
        let pool = self.pool().await?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv_entries (namespace, key, value, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(namespace, key)
            DO UPDATE SET
                value = excluded.value,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(namespace)
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&pool)
        .await
        .context("failed to upsert kv entry")?;

        Ok(())
    }

    async fn try_remove(&self, namespace: &str, key: &str) -> anyhow::Result<()> {
        let pool = self.pool().await?;

        sqlx::query(
            r#"
            DELETE FROM kv_entries
            WHERE namespace = ?1
              AND key = ?2
            "#,
        )
        .bind(namespace)
        .bind(key)
        .execute(&pool)
        .await
        .context("failed to delete kv entry")?;

        Ok(())
    }
}

fn backend_error(err: anyhow::Error) -> StorageError {
    tracing::error!("sqlite store failure: {err:?}");
    StorageError::Backend(format!("{err:#}"))
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredEntry>, StorageError> {
        self.try_get(namespace, key).await.map_err(backend_error)
    }

    async fn put(&self, namespace: &str, key: &str, value: String) -> Result<(), StorageError> {
        self.try_put(namespace, key, &value).await.map_err(backend_error)
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.try_remove(namespace, key).await.map_err(backend_error)
    }
}

/// Resolve `{app_data_dir}/adminlist/store.db`.
fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut path = base;
    path.push("adminlist");
    path.push("store.db");
    Ok(path)
}
