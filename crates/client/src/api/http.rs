//! `reqwest`-backed collection client.

use adminlist_core::{EntityKind, FetchError, Record, RecordId};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};

use super::{CollectionApi, ListPage, ListResponse, QueryParams};

/// Client for one REST collection (`{api_url}/{path}`).
#[derive(Debug, Clone)]
pub struct HttpCollectionApi {
    client: reqwest::Client,
    api_url: String,
    path: String,
    token: Option<String>,
}

impl HttpCollectionApi {
    pub fn new(api_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            path: path.into().trim_matches('/').to_string(),
            token: None,
        }
    }

    pub fn for_entity(api_url: impl Into<String>, entity: EntityKind) -> Self {
        Self::new(api_url, entity.path())
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.api_url, self.path)
    }

    fn record_url(&self, id: &RecordId) -> String {
        format!("{}/{}/{}", self.api_url, self.path, id)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, FetchError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| FetchError::network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::server(status, body));
        }

        Ok(resp)
    }
}

#[async_trait]
impl<R: Record> CollectionApi<R> for HttpCollectionApi {
    async fn list(&self, params: &QueryParams) -> Result<ListPage<R>, FetchError> {
        let req = self.client.get(self.collection_url()).query(params);
        let resp = self.send(req).await?;
        let body: ListResponse<R> = resp
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(body.into())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), FetchError> {
        let req = self.client.delete(self.record_url(id));
        self.send(req).await?;
        Ok(())
    }

    async fn update(&self, record: &R) -> Result<R, FetchError> {
        let req = self
            .client
            .put(self.record_url(&record.record_id()))
            .json(record);
        let resp = self.send(req).await?;
        resp.json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn create(&self, record: &R) -> Result<R, FetchError> {
        let req = self.client.post(self.collection_url()).json(record);
        let resp = self.send(req).await?;
        resp.json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn urls_are_normalized() {
        let api = HttpCollectionApi::new("http://localhost:8080/", "/customers/");
        assert_eq!(api.collection_url(), "http://localhost:8080/customers");
        assert_eq!(
            api.record_url(&RecordId::new("42")),
            "http://localhost:8080/customers/42"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_failure() {
        // Bind an ephemeral port, then free it so nothing is listening there.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let api = HttpCollectionApi::new(format!("http://{addr}"), "customers");
        let err = CollectionApi::<Value>::list(&api, &QueryParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
