//! Minimal REST client for an Appwrite documents collection.
//!
//! Only the calls the search counters need are implemented: equality and
//! ordered listing, fetch by id, create and partial update.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::StoreConfig;
use crate::constants::appwrite::{COUNT_ATTRIBUTE, TERM_ATTRIBUTE};

#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("Appwrite request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Appwrite returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Appwrite document already exists: {0}")]
    Conflict(String),

    #[error("Invalid Appwrite response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid Appwrite endpoint: {0}")]
    Endpoint(String),
}

impl From<url::ParseError> for AppwriteError {
    fn from(err: url::ParseError) -> Self {
        Self::Endpoint(err.to_string())
    }
}

/// A search counter document as stored in the collection.
#[derive(Debug, Clone, Deserialize)]
pub struct CounterDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    pub count: i64,
    pub movie_id: i64,
    #[serde(default)]
    pub poster_url: String,
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<CounterDocument>,
}

#[derive(Clone)]
pub struct AppwriteClient {
    client: Client,
    endpoint: String,
    project_id: String,
    database_id: String,
    collection_id: String,
    api_key: Option<String>,
}

impl AppwriteClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &StoreConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            database_id: config.database_id.clone(),
            collection_id: config.collection_id.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn documents_url(&self, document_id: Option<&str>) -> Result<Url, AppwriteError> {
        let mut url = Url::parse(&self.endpoint)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| AppwriteError::Endpoint(self.endpoint.clone()))?;
            segments.pop_if_empty().extend([
                "databases",
                self.database_id.as_str(),
                "collections",
                self.collection_id.as_str(),
                "documents",
            ]);
            if let Some(id) = document_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppwriteError> {
        let mut request = request.header("X-Appwrite-Project", &self.project_id);
        if let Some(key) = &self.api_key {
            request = request.header("X-Appwrite-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            return Err(AppwriteError::Conflict(body));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppwriteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn list(&self, queries: &[serde_json::Value]) -> Result<Vec<CounterDocument>, AppwriteError> {
        let mut url = self.documents_url(None)?;
        {
            let mut pairs = url.query_pairs_mut();
            for query in queries {
                pairs.append_pair("queries[]", &query.to_string());
            }
        }

        let list: DocumentList = self.send(self.client.get(url)).await?;
        Ok(list.documents)
    }

    pub async fn list_by_term(&self, term: &str) -> Result<Vec<CounterDocument>, AppwriteError> {
        debug!("Looking up search counter for '{}'", term);
        self.list(&[json!({
            "method": "equal",
            "attribute": TERM_ATTRIBUTE,
            "values": [term],
        })])
        .await
    }

    pub async fn list_top(&self, limit: u64) -> Result<Vec<CounterDocument>, AppwriteError> {
        self.list(&[
            json!({ "method": "limit", "values": [limit] }),
            json!({ "method": "orderDesc", "attribute": COUNT_ATTRIBUTE }),
        ])
        .await
    }

    pub async fn get_document(&self, document_id: &str) -> Result<CounterDocument, AppwriteError> {
        let url = self.documents_url(Some(document_id))?;
        self.send(self.client.get(url)).await
    }

    pub async fn create_counter(
        &self,
        document_id: &str,
        term: &str,
        movie_id: i64,
        poster_url: &str,
    ) -> Result<CounterDocument, AppwriteError> {
        let url = self.documents_url(None)?;
        let body = json!({
            "documentId": document_id,
            "data": {
                TERM_ATTRIBUTE: term,
                COUNT_ATTRIBUTE: 1,
                "movie_id": movie_id,
                "poster_url": poster_url,
            },
        });

        self.send(self.client.post(url).json(&body)).await
    }

    pub async fn update_count(
        &self,
        document_id: &str,
        count: i64,
    ) -> Result<CounterDocument, AppwriteError> {
        let url = self.documents_url(Some(document_id))?;
        let body = json!({ "data": { COUNT_ATTRIBUTE: count } });

        self.send(self.client.patch(url).json(&body)).await
    }
}
