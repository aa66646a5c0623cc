//! Search-count aggregation behind the trending list.

use std::sync::Arc;
use tracing::{debug, error};

use crate::constants::limits::TRENDING_LIMIT;
use crate::models::{MovieSummary, SearchCounter};
use crate::services::counter_store::{CounterStoreError, NewSearchCounter, SearchCountStore};

#[derive(Clone)]
pub struct TrendingService {
    store: Arc<dyn SearchCountStore>,
    image_base_url: String,
}

impl TrendingService {
    #[must_use]
    pub fn new(store: Arc<dyn SearchCountStore>, image_base_url: impl Into<String>) -> Self {
        Self {
            store,
            image_base_url: image_base_url.into(),
        }
    }

    /// Counts one search for `term`, remembering `movie` if the term is new.
    ///
    /// Never fails: store errors are logged and dropped.
    pub async fn record_search(&self, term: &str, movie: &MovieSummary) {
        if term.is_empty() {
            return;
        }

        let counter = NewSearchCounter {
            term: term.to_string(),
            movie_id: movie.id,
            poster_url: movie.poster_url(&self.image_base_url),
        };

        match self.store.increment_or_insert(&counter).await {
            Ok(()) => {
                metrics::counter!("search_count_writes_total", "outcome" => "success").increment(1);
                debug!("Recorded search for '{}'", term);
            }
            Err(e) => {
                metrics::counter!("search_count_writes_total", "outcome" => "error").increment(1);
                error!("Error updating search count for '{}': {}", term, e);
            }
        }
    }

    /// The most searched terms, highest count first.
    ///
    /// # Errors
    ///
    /// Returns the store error unchanged.
    pub async fn try_list_trending(&self) -> Result<Vec<SearchCounter>, CounterStoreError> {
        let mut counters = self.store.top(TRENDING_LIMIT).await?;
        counters.truncate(usize::try_from(TRENDING_LIMIT).unwrap_or(usize::MAX));
        Ok(counters)
    }

    /// Like [`Self::try_list_trending`] but an unreachable store yields an
    /// empty list.
    pub async fn list_trending(&self) -> Vec<SearchCounter> {
        match self.try_list_trending().await {
            Ok(counters) => {
                metrics::counter!("trending_reads_total", "outcome" => "success").increment(1);
                counters
            }
            Err(e) => {
                metrics::counter!("trending_reads_total", "outcome" => "error").increment(1);
                error!("Error fetching trending movies: {}", e);
                Vec::new()
            }
        }
    }
}
