//! HTTP client for the hosted document API.
//!
//! Collections map onto REST paths under the configured base URL:
//!
//! - `POST {base}/v1/{collection}:count` - server-side count
//! - `POST {base}/v1/{collection}:query` - filtered document fetch
//! - `GET/PUT/PATCH/DELETE {base}/v1/{collection}/{id}` - point operations
//! - `POST {base}/v1/{collection}` - insert with generated id
//!
//! Rate limiting is the one condition the services treat specially: a 429
//! (or a `RESOURCE_EXHAUSTED` error code in the body) becomes
//! [`StoreError::QuotaExhausted`] carrying the server's `Retry-After` hint.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::document::{Document, Fields};
use crate::error::StoreError;
use crate::query::{Filter, Page, Query};
use crate::DocumentStore;

/// Configuration for the hosted document API.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct RestStoreConfig {
    /// Base URL of the document API (e.g., `https://db.example.com`).
    pub base_url: String,
    /// Project/database identifier, used as a request header.
    pub project_id: String,
    /// API key for server-side access.
    pub api_key: SecretString,
}

impl std::fmt::Debug for RestStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStoreConfig")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Client for the hosted document API.
#[derive(Clone)]
pub struct RestStore {
    inner: Arc<RestStoreInner>,
}

struct RestStoreInner {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
}

impl RestStore {
    /// Create a new document API client.
    #[must_use]
    pub fn new(config: &RestStoreConfig) -> Self {
        Self {
            inner: Arc::new(RestStoreInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                project_id: config.project_id.clone(),
                api_key: config.api_key.expose_secret().to_owned(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.inner.base_url)
    }

    /// Send a request and decode the response.
    ///
    /// Reads the body as text first so failures can be logged with a bounded
    /// excerpt instead of a bare decode error.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = request
            .header("X-Project-Id", &self.inner.project_id)
            .bearer_auth(&self.inner.api_key)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting before anything else
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(StoreError::QuotaExhausted { retry_after_secs });
        }

        let response_text = response.text().await?;

        if !status.is_success() {
            // Some deployments report quota exhaustion as a body code rather
            // than a 429
            if let Ok(body) = serde_json::from_str::<ApiErrorBody>(&response_text)
                && body.code == "RESOURCE_EXHAUSTED"
            {
                return Err(StoreError::QuotaExhausted { retry_after_secs: 1 });
            }

            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "document API returned non-success status"
            );
            return Err(StoreError::Api {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "failed to parse document API response"
            );
            StoreError::Decode(e.to_string())
        })
    }

    /// Like [`Self::execute`] but treats 404 as `None`.
    async fn execute_optional<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>, StoreError> {
        let response = request
            .header("X-Project-Id", &self.inner.project_id)
            .bearer_auth(&self.inner.api_key)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(StoreError::QuotaExhausted { retry_after_secs });
        }

        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text)
            .map(Some)
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Send a write that needs no response body. Returns whether the target
    /// existed (404 → `false`); success bodies are discarded.
    async fn execute_unit(&self, request: reqwest::RequestBuilder) -> Result<bool, StoreError> {
        let response = request
            .header("X-Project-Id", &self.inner.project_id)
            .bearer_auth(&self.inner.api_key)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(StoreError::QuotaExhausted { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(true)
    }
}

#[async_trait::async_trait]
impl DocumentStore for RestStore {
    #[instrument(skip(self, filters), fields(collection = %collection))]
    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let url = self.url(&format!("{collection}:count"));
        let body = json!({ "filters": filters });
        let response: CountResponse = self.execute(self.inner.client.post(url).json(&body)).await?;
        Ok(response.count)
    }

    #[instrument(skip(self, query), fields(collection = %collection))]
    async fn query(&self, collection: &str, query: Query) -> Result<Page, StoreError> {
        let url = self.url(&format!("{collection}:query"));
        self.execute(self.inner.client.post(url).json(&query)).await
    }

    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.url(&format!("{collection}/{id}"));
        self.execute_optional(self.inner.client.get(url)).await
    }

    #[instrument(skip(self, fields), fields(collection = %collection))]
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let url = self.url(collection);
        self.execute(self.inner.client.post(url).json(&fields))
            .await
    }

    #[instrument(skip(self, fields), fields(collection = %collection, id = %id))]
    async fn put(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = self.url(&format!("{collection}/{id}"));
        let found = self
            .execute_unit(self.inner.client.put(&url).json(&fields))
            .await?;
        if !found {
            // A PUT creates on miss; a 404 here means the collection path
            // itself is invalid
            return Err(StoreError::Api {
                status: 404,
                body: format!("unknown collection path: {collection}"),
            });
        }
        Ok(())
    }

    #[instrument(skip(self, fields), fields(collection = %collection, id = %id))]
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = self.url(&format!("{collection}/{id}"));
        let found = self
            .execute_unit(self.inner.client.patch(&url).json(&fields))
            .await?;
        if !found {
            return Err(StoreError::NotFound(format!("{collection}/{id}")));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.url(&format!("{collection}/{id}"));
        // Deletes are idempotent; a 404 means the document is already gone
        let _ = self.execute_unit(self.inner.client.delete(&url)).await?;
        Ok(())
    }
}
