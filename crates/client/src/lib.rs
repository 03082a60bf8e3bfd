//! `adminlist-client`
//!
//! **Responsibility:** the data side of admin list pages.
//!
//! This crate provides:
//! - Remote list loading with a last-known-good cache fallback
//! - Client-side search, field filters, sorting and pagination
//! - Saved filter presets shared between pages over an event channel
//! - Optimistic deletes and updates with rollback
//!
//! Rendering is out of scope: a host (desktop shell, CLI) drives a
//! [`ListController`] and draws its [`ViewSlice`].

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod loader;
pub mod mutation;
pub mod pipeline;
pub mod saved_filters;
pub mod storage;

pub use api::{CollectionApi, ListPage, ListResponse, QueryParams};
pub use cache::{CacheSnapshot, CacheStore};
pub use config::ClientConfig;
pub use controller::{ListController, Notice, PageConfig};
pub use debounce::Debouncer;
pub use loader::{ListState, ListStatus, LoadOutcome, MountGuard, RemoteListLoader};
pub use mutation::{MutationLedger, MutationTicket, PendingChange};
pub use pipeline::{
    FilterState, PipelineConfig, SearchOptions, SortOrder, SortState, ViewSlice, derive_view,
};
pub use saved_filters::{SaveAvailability, SavedFilter, SavedFilterRegistry};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StoredEntry};

#[cfg(feature = "http")]
pub use api::HttpCollectionApi;
