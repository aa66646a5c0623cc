//! An interactive search session: typed input goes through the debouncer to
//! the catalog dispatcher, and the trending list is loaded once on start.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::SearchCounter;
use crate::services::catalog::{CatalogDispatcher, CatalogView};
use crate::services::debounce::debounce;
use crate::services::trending::TrendingService;

/// What the trending panel shows. A store failure shows as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrendingView {
    pub is_loading: bool,
    pub entries: Vec<SearchCounter>,
}

pub struct SearchSession {
    input: watch::Sender<String>,
    catalog: watch::Receiver<CatalogView>,
    trending: Arc<watch::Sender<TrendingView>>,
    trending_service: TrendingService,
    search_loop: JoinHandle<()>,
}

impl SearchSession {
    /// Starts the session. The empty initial input is dispatched at once and
    /// loads popular movies.
    #[must_use]
    pub fn start(
        dispatcher: Arc<CatalogDispatcher>,
        trending_service: TrendingService,
        window: Duration,
    ) -> Self {
        let (input, input_rx) = watch::channel(String::new());
        let catalog = dispatcher.subscribe();
        let mut settled = debounce(input_rx, window);

        let search_loop = tokio::spawn(async move {
            while let Some(query) = settled.recv().await {
                debug!("Dispatching settled query '{}'", query);
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    dispatcher.dispatch(&query).await;
                });
            }
        });

        let (trending, _) = watch::channel(TrendingView::default());

        let session = Self {
            input,
            catalog,
            trending: Arc::new(trending),
            trending_service,
            search_loop,
        };
        session.refresh_trending();
        session
    }

    /// Replaces the raw input. Setting the current value again is a no-op
    /// and does not restart the quiet window.
    pub fn set_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.input.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                *current = text;
                true
            }
        });
    }

    /// Waits until the dispatch for the current input has finished and
    /// returns the resulting view. Never resolves if that input is replaced
    /// before it settles, so callers bound it with a timeout.
    pub async fn settled_view(&self) -> Option<CatalogView> {
        let input = self.input.borrow().clone();
        let mut view = self.catalog.clone();

        view.wait_for(|v| !v.is_loading && v.requested.as_deref() == Some(input.as_str()))
            .await
            .ok()
            .map(|v| v.clone())
    }

    #[must_use]
    pub fn catalog(&self) -> watch::Receiver<CatalogView> {
        self.catalog.clone()
    }

    #[must_use]
    pub fn trending(&self) -> watch::Receiver<TrendingView> {
        self.trending.subscribe()
    }

    /// Reloads the trending list in the background.
    pub fn refresh_trending(&self) -> JoinHandle<()> {
        let view = Arc::clone(&self.trending);
        let service = self.trending_service.clone();

        tokio::spawn(async move {
            view.send_modify(|v| v.is_loading = true);
            let entries = service.list_trending().await;
            view.send_modify(|v| {
                v.is_loading = false;
                v.entries = entries;
            });
        })
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.search_loop.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::testing::{ScriptedCatalog, movie};
    use crate::services::counter_store::SearchCountStore;
    use crate::constants::messages::FETCH_FAILED;
    use crate::services::trending::testing::MemoryCounterStore;
    use tokio::time::{Instant, sleep};

    const WINDOW: Duration = Duration::from_millis(500);

    fn session() -> (Arc<ScriptedCatalog>, Arc<MemoryCounterStore>, SearchSession) {
        let catalog = Arc::new(ScriptedCatalog::default());
        let store = Arc::new(MemoryCounterStore::default());
        let trending = TrendingService::new(store.clone(), "https://image.tmdb.org/t/p/w500");
        let dispatcher = Arc::new(CatalogDispatcher::new(catalog.clone(), trending.clone()));
        (catalog, store, SearchSession::start(dispatcher, trending, WINDOW))
    }

    fn batman() -> crate::models::MovieSummary {
        let mut batman = movie(5, "Batman");
        batman.poster_path = Some("/x.jpg".to_string());
        batman
    }

    async fn wait_for_calls(catalog: &ScriptedCatalog, n: usize) {
        while catalog.calls().len() < n {
            sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_bat_searches_once_and_counts() {
        let (catalog, store, session) = session();
        catalog.respond("", vec![movie(1, "Popular")]);
        catalog.respond(
            "bat",
            vec![batman(), movie(9, "The Batman")],
        );

        wait_for_calls(&catalog, 1).await;
        assert_eq!(catalog.calls(), vec![""]);

        for text in ["b", "ba", "bat"] {
            session.set_input(text);
            sleep(Duration::from_millis(100)).await;
        }
        sleep(WINDOW).await;
        wait_for_calls(&catalog, 2).await;
        sleep(Duration::from_millis(10)).await;

        assert_eq!(catalog.calls(), vec!["", "bat"]);
        let counter = store.find("bat").await.unwrap().unwrap();
        assert_eq!(counter.count, 1);
        assert_eq!(counter.poster_url, "https://image.tmdb.org/t/p/w500/x.jpg");

        // Clear and search again: same counter goes to 2, poster unchanged.
        session.set_input("");
        sleep(WINDOW * 2).await;
        session.set_input("bat");
        sleep(WINDOW * 2).await;
        wait_for_calls(&catalog, 4).await;
        sleep(Duration::from_millis(10)).await;

        let counter = store.find("bat").await.unwrap().unwrap();
        assert_eq!(counter.count, 2);
        assert_eq!(counter.poster_url, "https://image.tmdb.org/t/p/w500/x.jpg");
        assert_eq!(session.catalog().borrow().query.as_deref(), Some("bat"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_popular_movies_requested_on_start() {
        let start = Instant::now();
        let (catalog, _store, _session) = session();

        wait_for_calls(&catalog, 1).await;

        assert_eq!(catalog.calls(), vec![""]);
        assert!(start.elapsed() < WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_view_waits_for_last_input() {
        let (catalog, _store, session) = session();
        catalog.respond("", vec![movie(1, "Popular")]);
        catalog.respond("dune", vec![movie(3, "Dune")]);

        let view = session.settled_view().await.unwrap();
        assert_eq!(view.movies, vec![movie(1, "Popular")]);

        session.set_input("dune");
        let view = session.settled_view().await.unwrap();

        assert!(!view.is_loading);
        assert_eq!(view.query.as_deref(), Some("dune"));
        assert_eq!(view.movies, vec![movie(3, "Dune")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_view_returns_failure() {
        let (catalog, _store, session) = session();
        catalog.respond("", vec![movie(1, "Popular")]);
        catalog.fail_on("boom");

        session.set_input("boom");
        let view = session.settled_view().await.unwrap();

        assert_eq!(view.requested.as_deref(), Some("boom"));
        assert_eq!(view.error_message.as_deref(), Some(FETCH_FAILED));
        assert_eq!(view.movies, vec![movie(1, "Popular")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trending_loaded_on_start() {
        let catalog = Arc::new(ScriptedCatalog::default());
        let store = Arc::new(MemoryCounterStore::default());
        let trending = TrendingService::new(store.clone(), "https://img");
        trending.record_search("dune", &movie(3, "Dune")).await;

        let dispatcher = Arc::new(CatalogDispatcher::new(catalog, trending.clone()));
        let session = SearchSession::start(dispatcher, trending, WINDOW);
        let mut view = session.trending();

        let entries = view
            .wait_for(|v| !v.is_loading && !v.entries.is_empty())
            .await
            .unwrap()
            .entries
            .clone();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].term, "dune");
    }

    #[tokio::test(start_paused = true)]
    async fn test_trending_failure_shows_empty() {
        let catalog = Arc::new(ScriptedCatalog::default());
        let store = Arc::new(MemoryCounterStore::default());
        store.fail(true);
        let trending = TrendingService::new(store.clone(), "https://img");
        let dispatcher = Arc::new(CatalogDispatcher::new(catalog, trending.clone()));
        let session = SearchSession::start(dispatcher, trending, WINDOW);

        session.refresh_trending().await.unwrap();

        let view = session.trending().borrow().clone();
        assert!(!view.is_loading);
        assert!(view.entries.is_empty());
    }
}
