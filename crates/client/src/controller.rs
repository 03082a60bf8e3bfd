//! One list page: loader, filter state, debounced search, preset events and
//! optimistic mutations wired together.
//!
//! Every admin list page uses this controller with its own [`PageConfig`];
//! there is no per-page copy of the filter/sort/paginate logic. The visible
//! slice is recomputed whenever the authoritative list, a pending mutation or
//! the filter state changes, and only then.

use std::sync::Arc;
use std::time::{Duration, Instant};

use adminlist_core::{
    ErrorInfo, ErrorKind, FetchError, FilterField, FilterValue, MutationError, PageKey, Record,
    RecordId,
};
use adminlist_events::{ApplySavedFilter, EventChannel, Subscription};

use crate::api::{CollectionApi, QueryParams};
use crate::cache::CacheStore;
use crate::debounce::Debouncer;
use crate::loader::{ListState, ListStatus, LoadOutcome, RemoteListLoader};
use crate::mutation::{MutationLedger, MutationTicket, PendingChange};
use crate::pipeline::{
    DEFAULT_PAGE_SIZE, FilterState, PipelineConfig, SearchOptions, SortState, ViewSlice,
    derive_view,
};
use crate::storage::KeyValueStore;

/// Static description of one list page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub page_key: PageKey,
    pub cache_key: String,
    /// Field filter definitions, in display order. Values are ignored.
    pub fields: Vec<FilterField>,
    pub pipeline: PipelineConfig,
    pub default_sort: Option<SortState>,
    pub page_size: usize,
    pub search: SearchOptions,
}

impl PageConfig {
    pub fn new(page_key: impl Into<PageKey>, cache_key: impl Into<String>) -> Self {
        Self {
            page_key: page_key.into(),
            cache_key: cache_key.into(),
            fields: Vec::new(),
            pipeline: PipelineConfig::default(),
            default_sort: None,
            page_size: DEFAULT_PAGE_SIZE,
            search: SearchOptions::default(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.fields.push(FilterField::new(name, label));
        self
    }

    pub fn pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn sort(mut self, sort: SortState) -> Self {
        self.default_sort = Some(sort);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn search(mut self, options: SearchOptions) -> Self {
        self.search = options;
        self
    }

    fn initial_filters(&self) -> FilterState {
        let filters = FilterState::new(self.page_size);
        match &self.default_sort {
            Some(sort) => filters.with_sort(sort.clone()),
            None => filters,
        }
    }
}

/// Message shown above the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Fetch failed; the page keeps working (usually from the cache).
    Dismissible(ErrorInfo),
    /// A delete/update was rolled back; the user must acknowledge it.
    Blocking(ErrorInfo),
}

impl Notice {
    pub fn info(&self) -> &ErrorInfo {
        match self {
            Notice::Dismissible(info) | Notice::Blocking(info) => info,
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, Notice::Blocking(_))
    }
}

pub struct ListController<R, A: ?Sized, S> {
    config: PageConfig,
    api: Arc<A>,
    loader: RemoteListLoader<R, S>,
    filters: FilterState,
    search_input: String,
    debouncer: Debouncer<String>,
    events: Subscription<ApplySavedFilter>,
    mutations: MutationLedger<R>,
    notice: Option<Notice>,
    view: ViewSlice<R>,
    presets_open: bool,
    recomputes: u64,
}

impl<R, A, S> ListController<R, A, S>
where
    R: Record,
    A: CollectionApi<R> + ?Sized,
    S: KeyValueStore,
{
    /// Mount a page. The controller subscribes to `channel` immediately, so it
    /// sees every preset applied from now on.
    pub fn new<C>(config: PageConfig, api: Arc<A>, store: Arc<S>, channel: &C) -> Self
    where
        C: EventChannel<ApplySavedFilter> + ?Sized,
    {
        let filters = config.initial_filters();
        let debouncer = Debouncer::new(Duration::from_millis(config.search.debounce_ms));
        let mut pipeline = config.pipeline.clone();
        pipeline.case_sensitive = pipeline.case_sensitive || config.search.case_sensitive;
        let page_size = config.page_size;

        tracing::debug!(page = %config.page_key, "mounting list controller");
        Self {
            config: PageConfig { pipeline, ..config },
            api,
            loader: RemoteListLoader::new(CacheStore::new(store)),
            filters,
            search_input: String::new(),
            debouncer,
            events: channel.subscribe(),
            mutations: MutationLedger::new(),
            notice: None,
            view: ViewSlice::empty(page_size),
            presets_open: false,
            recomputes: 0,
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn page_key(&self) -> &PageKey {
        &self.config.page_key
    }

    /// Fetch the list (falling back to the cache) and recompute the view.
    pub async fn reload(&mut self, params: &QueryParams) -> LoadOutcome {
        let outcome = self
            .loader
            .load(self.api.as_ref(), &self.config.cache_key, params)
            .await;

        if let LoadOutcome::Applied(status) = outcome {
            self.sync_notice();
            tracing::info!(page = %self.config.page_key, ?status, "list reloaded");
        }
        self.recompute();
        outcome
    }

    /// Re-derive the view from whatever the loader currently holds.
    ///
    /// For hosts that drive [`RemoteListLoader::load`] themselves.
    pub fn refresh(&mut self) {
        self.sync_notice();
        self.recompute();
    }

    pub fn loader(&self) -> &RemoteListLoader<R, S> {
        &self.loader
    }

    // Search

    /// Record a keystroke. The term is applied once input pauses.
    pub fn on_search_input(&mut self, term: impl Into<String>, now: Instant) {
        let term = term.into();
        self.search_input.clone_from(&term);
        self.debouncer.push(term, now);
    }

    /// Apply the typed term if its quiet period has elapsed. Returns whether
    /// the view was recomputed.
    pub fn poll_debounce(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(term) => self.apply_search(term),
            None => false,
        }
    }

    /// Wait for the typed term to settle, then apply it.
    pub async fn settle_search(&mut self) -> bool {
        match self.debouncer.settled().await {
            Some(term) => self.apply_search(term),
            None => false,
        }
    }

    /// Apply a term immediately, skipping the debounce (e.g. on Enter).
    pub fn apply_search_now(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        self.debouncer.cancel();
        self.search_input.clone_from(&term);
        self.apply_search(term)
    }

    /// The raw text in the search box, which may not be applied yet.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    fn apply_search(&mut self, term: String) -> bool {
        if !self.filters.set_search_term(term) {
            return false;
        }
        self.recompute();
        true
    }

    // Field filters, sort, pagination

    pub fn set_field_filter(&mut self, name: impl Into<String>, value: Option<FilterValue>) {
        self.filters.set_field(name, value);
        self.recompute();
    }

    /// Clear every field filter. The search term is kept.
    pub fn clear_filters(&mut self) {
        self.filters.clear_fields();
        self.recompute();
    }

    pub fn sort_by(&mut self, field: impl Into<String>) {
        self.filters.sort_by(field);
        self.recompute();
    }

    pub fn set_page(&mut self, page: usize) {
        if page == self.filters.page() {
            return;
        }
        self.filters.set_page(page);
        self.recompute();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.filters.set_page_size(page_size);
        self.recompute();
    }

    /// Field filter definitions with their current values, for rendering the
    /// filter bar and for saving a preset.
    pub fn filter_fields(&self) -> Vec<FilterField> {
        self.config
            .fields
            .iter()
            .map(|def| FilterField {
                value: self.filters.field(&def.name).cloned(),
                ..def.clone()
            })
            .collect()
    }

    // Presets

    pub fn open_presets(&mut self) {
        self.presets_open = true;
    }

    pub fn close_presets(&mut self) {
        self.presets_open = false;
    }

    pub fn presets_open(&self) -> bool {
        self.presets_open
    }

    /// Consume queued preset applications for this page. Returns how many
    /// were applied; messages for other pages are dropped.
    pub fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        for event in self.events.drain() {
            if !event.is_for(&self.config.page_key) {
                continue;
            }
            tracing::debug!(
                page = %self.config.page_key,
                filter_id = %event.filter_id,
                "applying saved filter"
            );
            self.filters.merge_fields(&event.values);
            self.presets_open = false;
            applied += 1;
        }
        if applied > 0 {
            self.recompute();
        }
        applied
    }

    // Mutations

    /// Hide `id` from the view until the delete is committed or rolled back.
    pub fn begin_delete(&mut self, id: RecordId) -> MutationTicket {
        let ticket = self.mutations.begin(PendingChange::Delete(id));
        self.recompute();
        ticket
    }

    /// Show `record` in place of its current version until committed or
    /// rolled back.
    pub fn begin_update(&mut self, record: R) -> MutationTicket {
        let ticket = self.mutations.begin(PendingChange::Update(record));
        self.recompute();
        ticket
    }

    /// The server accepted the change: fold it into the authoritative list.
    ///
    /// `confirmed` replaces the optimistic record of an update when the
    /// server returned its own version.
    pub fn commit_mutation(
        &mut self,
        ticket: &MutationTicket,
        confirmed: Option<R>,
    ) -> Result<(), MutationError> {
        let change = self
            .mutations
            .take(ticket)
            .ok_or(MutationError::UnknownTicket(ticket.id))?;
        let change = match (change, confirmed) {
            (PendingChange::Update(_), Some(record)) => PendingChange::Update(record),
            (change, _) => change,
        };
        self.loader.modify_items(|items| change.apply_to(items));
        tracing::info!(
            page = %self.config.page_key,
            record_id = %ticket.record_id,
            action = change.action(),
            "change committed"
        );
        self.recompute();
        Ok(())
    }

    /// The server refused the change: restore the row and raise a blocking
    /// notice.
    pub fn rollback_mutation(
        &mut self,
        ticket: &MutationTicket,
        cause: FetchError,
    ) -> MutationError {
        let Some(change) = self.mutations.take(ticket) else {
            return MutationError::UnknownTicket(ticket.id);
        };
        let action = change.action();
        tracing::warn!(
            page = %self.config.page_key,
            record_id = %ticket.record_id,
            action,
            "change rejected, rolling back: {cause}"
        );
        self.notice = Some(Notice::Blocking(ErrorInfo::new(
            ErrorKind::MutationFailed,
            format!("Could not {action} record {}: {cause}", ticket.record_id),
        )));
        self.recompute();
        MutationError::Rejected {
            action,
            source: cause,
        }
    }

    /// Optimistically delete `id`, then confirm with the server.
    pub async fn delete_record(&mut self, id: RecordId) -> Result<(), MutationError> {
        let ticket = self.begin_delete(id);
        match self.api.delete(&ticket.record_id).await {
            Ok(()) => self.commit_mutation(&ticket, None),
            Err(err) => Err(self.rollback_mutation(&ticket, err)),
        }
    }

    /// Optimistically update `record`, then confirm with the server.
    pub async fn update_record(&mut self, record: R) -> Result<(), MutationError> {
        let ticket = self.begin_update(record.clone());
        match self.api.update(&record).await {
            Ok(confirmed) => self.commit_mutation(&ticket, Some(confirmed)),
            Err(err) => Err(self.rollback_mutation(&ticket, err)),
        }
    }

    pub fn pending_mutations(&self) -> usize {
        self.mutations.len()
    }

    // Notices and lifecycle

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        if self.notice.take().is_some_and(|n| !n.is_blocking()) {
            self.loader.dismiss_error();
        }
    }

    /// Stop reacting: pending search input is dropped and in-flight loads
    /// resolve into nothing.
    pub fn unmount(&mut self) {
        self.debouncer.cancel();
        self.loader.mount_guard().unmount();
        tracing::debug!(page = %self.config.page_key, "list controller unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.loader.mount_guard().is_mounted()
    }

    // Accessors

    pub fn view(&self) -> &ViewSlice<R> {
        &self.view
    }

    pub fn state(&self) -> ListState<R> {
        self.loader.state()
    }

    pub fn status(&self) -> ListStatus {
        self.loader.with_state(|state| state.status)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Number of times the view has been derived since mount.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    fn sync_notice(&mut self) {
        if self.notice.as_ref().is_some_and(Notice::is_blocking) {
            return;
        }
        self.notice = self
            .loader
            .with_state(|state| state.error.clone())
            .map(Notice::Dismissible);
    }

    fn recompute(&mut self) {
        let view = self.loader.with_state(|state| {
            let items = self.mutations.project(&state.items);
            derive_view(&items, &self.filters, &self.config.pipeline)
        });
        self.recomputes += 1;
        tracing::debug!(
            page = %self.config.page_key,
            rows = view.rows.len(),
            total = view.total_filtered,
            "view recomputed"
        );
        self.view = view;
    }
}
