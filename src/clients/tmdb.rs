use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::constants::tmdb::POPULAR_SORT;
use crate::models::MovieSummary;
use crate::services::catalog::{CatalogError, MovieCatalog};

#[derive(Debug, Deserialize)]
struct TmdbPage {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl TmdbClient {
    #[must_use]
    pub fn with_shared_client(
        client: Client,
        base_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    pub async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        let mut url = self.endpoint("/search/movie")?;
        url.query_pairs_mut().append_pair("query", query);

        debug!("Searching TMDB for '{}'", query);
        self.fetch_results(url).await
    }

    pub async fn discover_popular(&self) -> Result<Vec<MovieSummary>, CatalogError> {
        let mut url = self.endpoint("/discover/movie")?;
        url.query_pairs_mut().append_pair("sort_by", POPULAR_SORT);

        debug!("Fetching popular movies from TMDB");
        self.fetch_results(url).await
    }

    async fn fetch_results(&self, url: Url) -> Result<Vec<MovieSummary>, CatalogError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status { status, body });
        }

        let body = response.text().await?;
        let page: TmdbPage = serde_json::from_str(&body)?;

        Ok(page.results)
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        self.search_movies(query).await
    }

    async fn popular(&self) -> Result<Vec<MovieSummary>, CatalogError> {
        self.discover_popular().await
    }
}
