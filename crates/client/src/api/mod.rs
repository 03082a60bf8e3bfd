//! Boundary to the remote collection API.
//!
//! List pages only need four calls against a REST collection: list, delete,
//! update and create. Pages are generic over this trait so tests can swap in
//! scripted fakes and the CLI can use the HTTP client.

use std::collections::BTreeMap;

use adminlist_core::{FetchError, Record, RecordId};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpCollectionApi;

/// Filters the server understands, passed through verbatim as query string.
///
/// Free-text search is not sent; it is applied client-side after debouncing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn status(self, status: impl Into<String>) -> Self {
        self.with("status", status)
    }

    /// Inclusive date range as `from`/`to` (`YYYY-MM-DD`).
    pub fn date_range(self, from: NaiveDate, to: NaiveDate) -> Self {
        self.with("from", from.format("%Y-%m-%d").to_string())
            .with("to", to.format("%Y-%m-%d").to_string())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One fetched collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<R> {
    pub items: Vec<R>,
    /// Server-side total, when the response carries one.
    pub total: Option<u64>,
}

impl<R> ListPage<R> {
    pub fn new(items: Vec<R>) -> Self {
        Self { items, total: None }
    }
}

/// Wire shape of `GET /{entity}`: either `{data, total?}` or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<R> {
    Envelope {
        data: Vec<R>,
        #[serde(default)]
        total: Option<u64>,
    },
    Bare(Vec<R>),
}

impl<R> From<ListResponse<R>> for ListPage<R> {
    fn from(response: ListResponse<R>) -> Self {
        match response {
            ListResponse::Envelope { data, total } => ListPage { items: data, total },
            ListResponse::Bare(items) => ListPage::new(items),
        }
    }
}

#[async_trait]
pub trait CollectionApi<R: Record>: Send + Sync {
    async fn list(&self, params: &QueryParams) -> Result<ListPage<R>, FetchError>;

    async fn delete(&self, id: &RecordId) -> Result<(), FetchError>;

    /// Replace the record; returns the server's version of it.
    async fn update(&self, record: &R) -> Result<R, FetchError>;

    async fn create(&self, record: &R) -> Result<R, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn decodes_enveloped_response_with_total() {
        let body = r#"{"data": [{"id": 1}, {"id": 2}], "total": 40}"#;
        let page: ListPage<Value> = serde_json::from_str::<ListResponse<Value>>(body)
            .unwrap()
            .into();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, Some(40));
    }

    #[test]
    fn decodes_bare_array_response() {
        let body = r#"[{"id": 1}]"#;
        let page: ListPage<Value> = serde_json::from_str::<ListResponse<Value>>(body)
            .unwrap()
            .into();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, None);
    }

    #[test]
    fn date_range_uses_iso_dates() {
        let params = QueryParams::new().status("paid").date_range(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert_eq!(params.get("status"), Some("paid"));
        assert_eq!(params.get("from"), Some("2024-01-01"));
        assert_eq!(params.get("to"), Some("2024-01-31"));
    }
}
