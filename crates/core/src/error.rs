//! Error taxonomy for list pages.
//!
//! Fetch failures are recovered locally (cache fallback) and surface as a
//! dismissible notice; save rejections surface as a disabled control; only
//! mutation failures are blocking. Nothing here is meant to crash rendering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::FilterId;

/// Failure of a call against the remote collection API.
///
/// Transport errors and non-2xx statuses are both "fetch failed" for fallback
/// purposes; the variant only changes the message shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network(_) => ErrorKind::NetworkFailure,
            FetchError::Server { .. } | FetchError::Decode(_) => ErrorKind::ServerError,
        }
    }

    /// One-line, user-facing summary for the degraded-mode banner.
    pub fn summary(&self) -> String {
        match self {
            FetchError::Network(_) => {
                "Could not reach the server; showing the last saved list.".to_string()
            }
            FetchError::Server { status, .. } => {
                format!("The server answered with status {status}; showing the last saved list.")
            }
            FetchError::Decode(_) => {
                "The server sent an unreadable response; showing the last saved list.".to_string()
            }
        }
    }
}

/// Failure of the durable key/value storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("failed to encode value for storage: {0}")]
    Encode(String),
}

/// Why a "Save Filter" action is unavailable.
///
/// Rendered as a disabled control with a tooltip, never as an error dialog.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveRejection {
    #[error("set at least one filter to save it")]
    NoActiveFields,
    #[error("this filter is already saved")]
    Duplicate { existing: FilterId },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SavedFilterError {
    #[error(transparent)]
    Rejected(#[from] SaveRejection),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to publish saved filter: {0}")]
    Publish(String),
}

/// Failure of a delete/update against the remote API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("{action} failed: {source}")]
    Rejected {
        action: &'static str,
        #[source]
        source: FetchError,
    },
    #[error("no pending change with ticket {0}")]
    UnknownTicket(u64),
}

/// Failure while assembling client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Classification of a failure shown on a list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkFailure,
    ServerError,
    CacheCorrupt,
    ValidationRejected,
    MutationFailed,
    Storage,
}

/// Error attached to a `ListState`, already phrased for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&FetchError> for ErrorInfo {
    fn from(err: &FetchError) -> Self {
        Self::new(err.kind(), err.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_status_failures_map_to_distinct_kinds() {
        assert_eq!(FetchError::network("refused").kind(), ErrorKind::NetworkFailure);
        assert_eq!(FetchError::server(503, "down").kind(), ErrorKind::ServerError);
    }

    #[test]
    fn summary_mentions_status_code() {
        let info = ErrorInfo::from(&FetchError::server(502, "bad gateway"));
        assert_eq!(info.kind, ErrorKind::ServerError);
        assert!(info.message.contains("502"));
    }
}
