use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::clients::appwrite::AppwriteClient;
use crate::clients::tmdb::TmdbClient;
use crate::config::{Config, StoreBackend};
use crate::db::Store;
use crate::services::{
    AppwriteCounterStore, CatalogDispatcher, MovieCatalog, SeaOrmCounterStore, SearchCountStore,
    TrendingService,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused by the catalog and the Appwrite store for connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent("Cinetrend/1.0")
        .pool_max_idle_per_host(10);

    if timeout_seconds > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_seconds));
    }

    builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Explicitly constructed clients and services for one process.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Arc<dyn SearchCountStore>,

    pub trending: TrendingService,

    pub dispatcher: Arc<CatalogDispatcher>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let catalog_http = build_shared_http_client(config.catalog.request_timeout_seconds)?;
        let catalog = Arc::new(TmdbClient::with_shared_client(
            catalog_http,
            config.catalog.base_url.clone(),
            config.catalog.api_token.clone(),
        ));

        let store: Arc<dyn SearchCountStore> = match config.store.backend {
            StoreBackend::Sqlite => {
                let db = Store::with_pool_options(
                    &config.general.database_path,
                    config.general.max_db_connections,
                    config.general.min_db_connections,
                )
                .await?;
                info!("Search counters stored in {}", config.general.database_path);
                Arc::new(SeaOrmCounterStore::new(db))
            }
            StoreBackend::Appwrite => {
                let http = build_shared_http_client(config.store.request_timeout_seconds)?;
                info!(
                    "Search counters stored in Appwrite collection {}/{}",
                    config.store.database_id, config.store.collection_id
                );
                Arc::new(AppwriteCounterStore::new(AppwriteClient::with_shared_client(
                    http,
                    &config.store,
                )))
            }
        };

        Ok(Self::with_components(config, catalog, store))
    }

    /// Wires the services around already built clients.
    #[must_use]
    pub fn with_components(
        config: Config,
        catalog: Arc<dyn MovieCatalog>,
        store: Arc<dyn SearchCountStore>,
    ) -> Self {
        let trending = TrendingService::new(store.clone(), config.catalog.image_base_url.clone());
        let dispatcher = Arc::new(CatalogDispatcher::new(catalog, trending.clone()));

        Self {
            config,
            store,
            trending,
            dispatcher,
        }
    }
}
