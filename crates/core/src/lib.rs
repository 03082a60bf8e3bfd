//! `adminlist-core`: shared vocabulary for list pages.
//!
//! This crate contains **pure** types (no IO, no async): identifiers, the
//! record abstraction the pipeline reads from, filter values, the resource
//! catalog and the error taxonomy.

pub mod entity;
pub mod error;
pub mod filter;
pub mod id;
pub mod record;

pub use entity::{EntityKind, UnknownEntity};
pub use error::{
    ConfigError, ErrorInfo, ErrorKind, FetchError, MutationError, SaveRejection,
    SavedFilterError, StorageError,
};
pub use filter::{FilterField, FilterValue, FilterValues, active_values};
pub use id::{FilterId, PageKey, RecordId, UserId};
pub use record::{FieldKind, FieldValue, Record};
