//! Remote list loading with cache fallback.
//!
//! Produces the single authoritative list of a mounted page:
//!
//! ```text
//! load() ──► fetch ──ok──► write cache ──► Ready / Empty
//!                 └─err──► read cache ──hit──► DegradedFromCache (+ notice)
//!                                       └─miss─► Failed
//! ```
//!
//! Loads for the same page may overlap. Each load takes a generation number
//! when it starts; a result whose generation is no longer the latest when it
//! resolves is dropped, so a slow early response cannot overwrite a newer one.
//! The same check guards the cache write: the generation is re-checked and the
//! snapshot written while holding the write gate, so a superseded load never
//! reaches the cache. Results that resolve after the page unmounted are
//! dropped too, and an unmounted page does not start new loads.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use adminlist_core::{ErrorInfo, Record};
use serde::{Deserialize, Serialize};

use crate::api::{CollectionApi, QueryParams};
use crate::cache::CacheStore;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Loading,
    Ready,
    DegradedFromCache,
    Empty,
    Failed,
}

/// The list a page currently considers authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<R> {
    pub status: ListStatus,
    pub items: Vec<R>,
    pub error: Option<ErrorInfo>,
    pub total: Option<u64>,
    /// Generation of the load that produced this state (0 before any load).
    pub generation: u64,
}

impl<R> Default for ListState<R> {
    fn default() -> Self {
        Self {
            status: ListStatus::Loading,
            items: Vec::new(),
            error: None,
            total: None,
            generation: 0,
        }
    }
}

/// Shared "component still mounted" flag.
#[derive(Debug, Clone)]
pub struct MountGuard(Arc<AtomicBool>);

impl MountGuard {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to one `load` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(ListStatus),
    /// A newer load started before this one resolved.
    Superseded { generation: u64, latest: u64 },
    Unmounted,
}

pub struct RemoteListLoader<R, S> {
    cache: CacheStore<R, S>,
    state: Mutex<ListState<R>>,
    generation: AtomicU64,
    /// Held across the generation re-check and the cache write.
    write_gate: tokio::sync::Mutex<()>,
    mount: MountGuard,
}

impl<R, S> RemoteListLoader<R, S>
where
    R: Record,
    S: KeyValueStore,
{
    pub fn new(cache: CacheStore<R, S>) -> Self {
        Self {
            cache,
            state: Mutex::new(ListState::default()),
            generation: AtomicU64::new(0),
            write_gate: tokio::sync::Mutex::new(()),
            mount: MountGuard::new(),
        }
    }

    pub fn mount_guard(&self) -> MountGuard {
        self.mount.clone()
    }

    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ListState<R> {
        self.lock().clone()
    }

    /// Borrow the current state without cloning the items.
    pub fn with_state<T>(&self, f: impl FnOnce(&ListState<R>) -> T) -> T {
        f(&self.lock())
    }

    /// Apply a confirmed change to the authoritative items.
    ///
    /// Used for mutations the server acknowledged; the cache snapshot is not
    /// touched.
    pub fn modify_items(&self, f: impl FnOnce(&mut Vec<R>)) {
        let mut state = self.lock();
        f(&mut state.items);
        if state.status == ListStatus::Ready && state.items.is_empty() {
            state.status = ListStatus::Empty;
        } else if state.status == ListStatus::Empty && !state.items.is_empty() {
            state.status = ListStatus::Ready;
        }
    }

    /// Clear the degraded-mode notice; items and status are unchanged.
    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    pub async fn load<A>(&self, api: &A, cache_key: &str, params: &QueryParams) -> LoadOutcome
    where
        A: CollectionApi<R> + ?Sized,
    {
        if !self.mount.is_mounted() {
            tracing::debug!(cache_key, "not loading: page is unmounted");
            return LoadOutcome::Unmounted;
        }

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        {
            let mut state = self.lock();
            state.status = ListStatus::Loading;
            state.generation = generation;
        }
        tracing::info!(cache_key, generation, "loading list");

        match api.list(params).await {
            Ok(page) => {
                if let Some(outcome) = self
                    .write_snapshot(generation, cache_key, &page.items)
                    .await
                {
                    return outcome;
                }

                self.apply(generation, |state| {
                    state.status = if page.items.is_empty() {
                        ListStatus::Empty
                    } else {
                        ListStatus::Ready
                    };
                    state.total = page.total;
                    state.items = page.items;
                    state.error = None;
                })
            }
            Err(err) => {
                tracing::warn!(cache_key, generation, "list fetch failed: {err}");
                let snapshot = self.cache.read(cache_key).await;

                self.apply(generation, |state| {
                    state.total = None;
                    state.error = Some(match &snapshot {
                        Some(_) => ErrorInfo::from(&err),
                        None => {
                            ErrorInfo::new(err.kind(), format!("Could not load the list: {err}"))
                        }
                    });
                    match snapshot {
                        Some(snapshot) => {
                            tracing::warn!(
                                cache_key,
                                items = snapshot.items.len(),
                                saved_at = %snapshot.saved_at,
                                "serving cached snapshot"
                            );
                            state.status = ListStatus::DegradedFromCache;
                            state.items = snapshot.items;
                        }
                        None => {
                            state.status = ListStatus::Failed;
                            state.items = Vec::new();
                        }
                    }
                })
            }
        }
    }

    /// Write the snapshot unless this load was superseded or unmounted.
    ///
    /// The check and the write happen under the write gate, so a newer load
    /// either writes after this one or sees it superseded.
    async fn write_snapshot(
        &self,
        generation: u64,
        cache_key: &str,
        items: &[R],
    ) -> Option<LoadOutcome> {
        let _gate = self.write_gate.lock().await;
        if let Some(outcome) = self.discard_reason(generation) {
            return Some(outcome);
        }

        if let Err(err) = self.cache.write(cache_key, items).await {
            // The fresh list is still authoritative; only the fallback is stale.
            tracing::error!(cache_key, "failed to refresh cache snapshot: {err}");
        }
        None
    }

    fn discard_reason(&self, generation: u64) -> Option<LoadOutcome> {
        if !self.mount.is_mounted() {
            tracing::debug!(generation, "dropping load result after unmount");
            return Some(LoadOutcome::Unmounted);
        }
        let latest = self.latest_generation();
        if generation != latest {
            tracing::debug!(generation, latest, "dropping superseded load result");
            return Some(LoadOutcome::Superseded { generation, latest });
        }
        None
    }

    fn apply(&self, generation: u64, f: impl FnOnce(&mut ListState<R>)) -> LoadOutcome {
        // Re-checked under the lock: a newer load may have started while this
        // one was writing or reading the cache.
        let mut state = self.lock();
        if let Some(outcome) = self.discard_reason(generation) {
            return outcome;
        }
        f(&mut state);
        state.generation = generation;
        LoadOutcome::Applied(state.status)
    }

    fn lock(&self) -> MutexGuard<'_, ListState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use adminlist_core::{ErrorKind, FetchError, RecordId, StorageError};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    use crate::api::ListPage;
    use crate::storage::{MemoryStore, StoredEntry};

    /// Scripted API: each `list` call pops the next (delay, result).
    struct ScriptedApi {
        script: Mutex<VecDeque<(u64, Result<Vec<Value>, FetchError>)>>,
    }

    impl ScriptedApi {
        fn new(script: Vec<(u64, Result<Vec<Value>, FetchError>)>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    #[async_trait]
    impl CollectionApi<Value> for ScriptedApi {
        async fn list(&self, _params: &QueryParams) -> Result<ListPage<Value>, FetchError> {
            let (delay, result) = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected list call");
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            result.map(ListPage::new)
        }

        async fn delete(&self, _id: &RecordId) -> Result<(), FetchError> {
            Ok(())
        }

        async fn update(&self, record: &Value) -> Result<Value, FetchError> {
            Ok(record.clone())
        }

        async fn create(&self, record: &Value) -> Result<Value, FetchError> {
            Ok(record.clone())
        }
    }

    /// Memory store whose first `put` stalls.
    #[derive(Default)]
    struct SlowFirstPut {
        inner: MemoryStore,
        puts: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for SlowFirstPut {
        async fn get(
            &self,
            namespace: &str,
            key: &str,
        ) -> Result<Option<StoredEntry>, StorageError> {
            self.inner.get(namespace, key).await
        }

        async fn put(&self, namespace: &str, key: &str, value: String) -> Result<(), StorageError> {
            if self.puts.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            self.inner.put(namespace, key, value).await
        }

        async fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
            self.inner.remove(namespace, key).await
        }
    }

    fn loader() -> RemoteListLoader<Value, MemoryStore> {
        RemoteListLoader::new(CacheStore::new(Arc::new(MemoryStore::new())))
    }

    fn customers() -> Vec<Value> {
        vec![json!({"id": 1, "name": "Acme"}), json!({"id": 2, "name": "Zed"})]
    }

    #[tokio::test]
    async fn successful_fetch_is_ready_and_cached() {
        let loader = loader();
        let api = ScriptedApi::new(vec![(0, Ok(customers()))]);

        let outcome = loader.load(&api, "customers", &QueryParams::new()).await;

        assert_eq!(outcome, LoadOutcome::Applied(ListStatus::Ready));
        let state = loader.state();
        assert_eq!(state.items, customers());
        assert!(state.error.is_none());
        assert_eq!(loader.cache.read("customers").await.unwrap().items, customers());
    }

    #[tokio::test]
    async fn empty_collection_is_empty_status() {
        let loader = loader();
        let api = ScriptedApi::new(vec![(0, Ok(vec![]))]);

        let outcome = loader.load(&api, "taxes", &QueryParams::new()).await;

        assert_eq!(outcome, LoadOutcome::Applied(ListStatus::Empty));
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_last_snapshot() {
        let loader = loader();
        let api = ScriptedApi::new(vec![
            (0, Ok(customers())),
            (0, Err(FetchError::network("connection refused"))),
        ]);

        loader.load(&api, "customers", &QueryParams::new()).await;
        let outcome = loader.load(&api, "customers", &QueryParams::new()).await;

        assert_eq!(outcome, LoadOutcome::Applied(ListStatus::DegradedFromCache));
        let state = loader.state();
        assert_eq!(state.items, customers());
        let error = state.error.unwrap();
        assert_eq!(error.kind, ErrorKind::NetworkFailure);
        assert!(!error.message.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_without_snapshot_is_failed_and_empty() {
        let loader = loader();
        let api = ScriptedApi::new(vec![(0, Err(FetchError::server(500, "boom")))]);

        let outcome = loader.load(&api, "vendors", &QueryParams::new()).await;

        assert_eq!(outcome, LoadOutcome::Applied(ListStatus::Failed));
        let state = loader.state();
        assert!(state.items.is_empty());
        assert_eq!(state.error.unwrap().kind, ErrorKind::ServerError);
    }

    #[tokio::test]
    async fn slow_earlier_response_does_not_overwrite_newer_one() {
        let loader = loader();
        let api = ScriptedApi::new(vec![
            (80, Ok(vec![json!({"id": "stale"})])),
            (5, Ok(vec![json!({"id": "fresh"})])),
        ]);
        let params = QueryParams::new();

        let (first, second) = tokio::join!(
            loader.load(&api, "items", &params),
            loader.load(&api, "items", &params),
        );

        assert_eq!(second, LoadOutcome::Applied(ListStatus::Ready));
        assert_eq!(
            first,
            LoadOutcome::Superseded {
                generation: 1,
                latest: 2
            }
        );
        let state = loader.state();
        assert_eq!(state.items, vec![json!({"id": "fresh"})]);
        assert_eq!(state.generation, 2);
        // The stale response never reached the cache either.
        assert_eq!(
            loader.cache.read("items").await.unwrap().items,
            vec![json!({"id": "fresh"})]
        );
    }

    #[tokio::test]
    async fn superseded_load_stalled_in_cache_write_does_not_clobber_newer_snapshot() {
        let loader = RemoteListLoader::new(CacheStore::new(Arc::new(SlowFirstPut::default())));
        let api = ScriptedApi::new(vec![
            (0, Ok(vec![json!({"id": "stale"})])),
            (0, Ok(vec![json!({"id": "fresh"})])),
        ]);
        let params = QueryParams::new();

        let (first, second) = tokio::join!(
            loader.load(&api, "items", &params),
            loader.load(&api, "items", &params),
        );

        assert_eq!(
            first,
            LoadOutcome::Superseded {
                generation: 1,
                latest: 2
            }
        );
        assert_eq!(second, LoadOutcome::Applied(ListStatus::Ready));
        assert_eq!(loader.state().items, vec![json!({"id": "fresh"})]);
        assert_eq!(
            loader.cache.read("items").await.unwrap().items,
            vec![json!({"id": "fresh"})]
        );
    }

    #[tokio::test]
    async fn unmounted_loader_does_not_fetch_or_change_state() {
        let loader = loader();
        let api = ScriptedApi::new(vec![(0, Ok(customers()))]);
        loader.load(&api, "customers", &QueryParams::new()).await;
        let before = loader.state();

        loader.mount_guard().unmount();
        // The script is exhausted: a second fetch would panic.
        let outcome = loader.load(&api, "customers", &QueryParams::new()).await;

        assert_eq!(outcome, LoadOutcome::Unmounted);
        assert_eq!(loader.state(), before);
        assert_eq!(loader.latest_generation(), 1);
    }

    #[tokio::test]
    async fn result_after_unmount_is_dropped() {
        let loader = loader();
        let api = ScriptedApi::new(vec![(20, Ok(customers()))]);
        let guard = loader.mount_guard();

        let params = QueryParams::new();

        let (outcome, ()) = tokio::join!(
            loader.load(&api, "customers", &params),
            async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                guard.unmount();
            }
        );

        assert_eq!(outcome, LoadOutcome::Unmounted);
        assert!(loader.state().items.is_empty());
    }

    #[tokio::test]
    async fn dismissing_the_notice_keeps_degraded_items() {
        let loader = loader();
        let api = ScriptedApi::new(vec![
            (0, Ok(customers())),
            (0, Err(FetchError::network("offline"))),
        ]);
        loader.load(&api, "customers", &QueryParams::new()).await;
        loader.load(&api, "customers", &QueryParams::new()).await;

        loader.dismiss_error();

        let state = loader.state();
        assert!(state.error.is_none());
        assert_eq!(state.status, ListStatus::DegradedFromCache);
        assert_eq!(state.items.len(), 2);
    }
}
