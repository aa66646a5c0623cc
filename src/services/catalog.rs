//! Catalog lookups for settled search queries.
//!
//! [`CatalogDispatcher`] resolves a settled query to either the search or
//! the popular endpoint, publishes the outcome as a [`CatalogView`], and
//! feeds the top hit of every non-empty search into the trending counters.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::constants::messages::FETCH_FAILED;
use crate::models::MovieSummary;
use crate::services::trending::TrendingService;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Catalog returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Free-text movie search.
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError>;

    /// Movies sorted by popularity, used when there is no query.
    async fn popular(&self) -> Result<Vec<MovieSummary>, CatalogError>;
}

/// What a movie list panel shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogView {
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub movies: Vec<MovieSummary>,
    /// Query the current `movies` were fetched for.
    pub query: Option<String>,
    /// Query of the most recent dispatch, finished or not.
    pub requested: Option<String>,
}

pub struct CatalogDispatcher {
    catalog: Arc<dyn MovieCatalog>,
    trending: TrendingService,
    latest: AtomicU64,
    view: watch::Sender<CatalogView>,
}

impl CatalogDispatcher {
    #[must_use]
    pub fn new(catalog: Arc<dyn MovieCatalog>, trending: TrendingService) -> Self {
        let (view, _) = watch::channel(CatalogView::default());
        Self {
            catalog,
            trending,
            latest: AtomicU64::new(0),
            view,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogView> {
        self.view.subscribe()
    }

    #[must_use]
    pub fn view(&self) -> CatalogView {
        self.view.borrow().clone()
    }

    /// Fetches movies for `query` and records the search when it had hits.
    ///
    /// An empty query loads popular movies and records nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the catalog is unreachable, answers with
    /// a non-success status, or sends a body that does not decode.
    pub async fn fetch_movies(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        let endpoint = if query.is_empty() { "popular" } else { "search" };

        let result = if query.is_empty() {
            self.catalog.popular().await
        } else {
            self.catalog.search(query).await
        };

        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::counter!("catalog_requests_total", "endpoint" => endpoint, "outcome" => outcome)
            .increment(1);

        let movies = result?;

        if !query.is_empty()
            && let Some(first) = movies.first()
        {
            self.trending.record_search(query, first).await;
        }

        Ok(movies)
    }

    /// Runs [`Self::fetch_movies`] and publishes the result to the view.
    ///
    /// Each call takes a new sequence number. If a newer dispatch started
    /// while this one was in flight, its result is dropped so a slow old
    /// response cannot overwrite a newer list. Returns the sequence number.
    pub async fn dispatch(&self, query: &str) -> u64 {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        self.view.send_modify(|view| {
            view.is_loading = true;
            view.error_message = None;
            view.requested = Some(query.to_string());
        });

        let result = self.fetch_movies(query).await;

        if let Err(e) = &result {
            error!("Error fetching movies for '{}': {}", query, e);
        }

        if self.latest.load(Ordering::SeqCst) != seq {
            debug!("Discarding stale catalog response #{} for '{}'", seq, query);
            return seq;
        }

        self.view.send_modify(|view| {
            view.is_loading = false;
            match result {
                Ok(movies) => {
                    info!("Loaded {} movies for '{}'", movies.len(), query);
                    view.movies = movies;
                    view.query = Some(query.to_string());
                }
                Err(_) => {
                    view.error_message = Some(FETCH_FAILED.to_string());
                }
            }
        });

        seq
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    /// Catalog fake answering from a table. Queries with a registered gate
    /// block until the gate is released.
    #[derive(Default)]
    pub struct ScriptedCatalog {
        pub results: Mutex<HashMap<String, Vec<MovieSummary>>>,
        pub failing: Mutex<Vec<String>>,
        pub gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedCatalog {
        pub fn respond(&self, query: &str, movies: Vec<MovieSummary>) {
            self.results
                .lock()
                .unwrap()
                .insert(query.to_string(), movies);
        }

        pub fn fail_on(&self, query: &str) {
            self.failing.lock().unwrap().push(query.to_string());
        }

        pub fn gate(&self, query: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(query.to_string(), rx);
            tx
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        async fn answer(&self, key: &str) -> Result<Vec<MovieSummary>, CatalogError> {
            self.calls.lock().unwrap().push(key.to_string());

            let gate = self.gates.lock().unwrap().remove(key);
            if let Some(gate) = gate {
                gate.await.ok();
            }

            if self.failing.lock().unwrap().iter().any(|q| q == key) {
                return Err(CatalogError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }

            Ok(self
                .results
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .unwrap_or_default())
        }
    }

    #[async_trait]
    impl MovieCatalog for ScriptedCatalog {
        async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
            self.answer(query).await
        }

        async fn popular(&self) -> Result<Vec<MovieSummary>, CatalogError> {
            self.answer("").await
        }
    }

    pub fn movie(id: i64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/{id}.jpg")),
            popularity: 1.0,
            vote_average: None,
            release_date: None,
            original_language: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ScriptedCatalog, movie};
    use super::*;
    use crate::services::counter_store::SearchCountStore;
    use crate::services::trending::testing::MemoryCounterStore;

    fn dispatcher() -> (
        Arc<ScriptedCatalog>,
        Arc<MemoryCounterStore>,
        Arc<CatalogDispatcher>,
    ) {
        let catalog = Arc::new(ScriptedCatalog::default());
        let store = Arc::new(MemoryCounterStore::default());
        let trending = TrendingService::new(store.clone(), "https://img");
        let dispatcher = Arc::new(CatalogDispatcher::new(catalog.clone(), trending));
        (catalog, store, dispatcher)
    }

    #[tokio::test]
    async fn test_empty_query_loads_popular_without_recording() {
        let (catalog, store, dispatcher) = dispatcher();
        catalog.respond("", vec![movie(1, "Popular")]);

        dispatcher.dispatch("").await;

        let view = dispatcher.view();
        assert!(!view.is_loading);
        assert_eq!(view.movies.len(), 1);
        assert_eq!(view.query.as_deref(), Some(""));
        assert!(store.counters.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_records_first_result() {
        let (catalog, store, dispatcher) = dispatcher();
        catalog.respond("bat", vec![movie(5, "Batman"), movie(6, "Batman Returns")]);

        dispatcher.dispatch("bat").await;
        dispatcher.dispatch("bat").await;

        assert_eq!(catalog.calls(), vec!["bat", "bat"]);
        let counter = store.find("bat").await.unwrap().unwrap();
        assert_eq!(counter.count, 2);
        assert_eq!(counter.movie_id, 5);
        assert_eq!(counter.poster_url, "https://img/5.jpg");
    }

    #[tokio::test]
    async fn test_zero_results_does_not_record() {
        let (_, store, dispatcher) = dispatcher();

        dispatcher.dispatch("zzzz").await;

        assert!(dispatcher.view().movies.is_empty());
        assert!(store.find("zzzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_movies_and_sets_message() {
        let (catalog, store, dispatcher) = dispatcher();
        catalog.respond("", vec![movie(1, "Popular")]);
        catalog.fail_on("bat");

        dispatcher.dispatch("").await;
        dispatcher.dispatch("bat").await;

        let view = dispatcher.view();
        assert!(!view.is_loading);
        assert_eq!(view.error_message.as_deref(), Some(FETCH_FAILED));
        assert_eq!(view.movies, vec![movie(1, "Popular")]);
        assert_eq!(view.query.as_deref(), Some(""));
        assert_eq!(view.requested.as_deref(), Some("bat"));
        assert!(store.find("bat").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_dispatch_clears_error() {
        let (catalog, _, dispatcher) = dispatcher();
        catalog.fail_on("bad");
        catalog.respond("good", vec![movie(2, "Good")]);

        dispatcher.dispatch("bad").await;
        assert!(dispatcher.view().error_message.is_some());

        dispatcher.dispatch("good").await;
        let view = dispatcher.view();
        assert!(view.error_message.is_none());
        assert_eq!(view.movies, vec![movie(2, "Good")]);
    }

    #[tokio::test]
    async fn test_late_response_does_not_overwrite_newer_one() {
        let (catalog, store, dispatcher) = dispatcher();
        catalog.respond("a", vec![movie(1, "Alien")]);
        catalog.respond("ab", vec![movie(2, "Abyss")]);
        let release_a = catalog.gate("a");

        let slow = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.dispatch("a").await })
        };
        while catalog.calls().is_empty() {
            tokio::task::yield_now().await;
        }

        dispatcher.dispatch("ab").await;
        assert_eq!(dispatcher.view().movies, vec![movie(2, "Abyss")]);

        release_a.send(()).unwrap();
        slow.await.unwrap();

        let view = dispatcher.view();
        assert!(!view.is_loading);
        assert_eq!(view.query.as_deref(), Some("ab"));
        assert_eq!(view.requested.as_deref(), Some("ab"));
        assert_eq!(view.movies, vec![movie(2, "Abyss")]);

        // The slow search still counts as a search.
        assert_eq!(store.find("a").await.unwrap().unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_view_is_loading_while_in_flight() {
        let (catalog, _, dispatcher) = dispatcher();
        let release = catalog.gate("bat");
        let mut views = dispatcher.subscribe();

        let task = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.dispatch("bat").await })
        };

        views.changed().await.unwrap();
        assert!(views.borrow_and_update().is_loading);

        release.send(()).unwrap();
        task.await.unwrap();
        assert!(!dispatcher.view().is_loading);
    }
}
