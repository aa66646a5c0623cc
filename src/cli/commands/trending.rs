use anyhow::Context;

use crate::constants::messages::TRENDING_FAILED;
use crate::state::SharedState;

pub async fn cmd_trending(state: &SharedState) -> anyhow::Result<()> {
    let counters = state
        .trending
        .try_list_trending()
        .await
        .context(TRENDING_FAILED)?;

    if counters.is_empty() {
        println!("No searches recorded yet.");
        return Ok(());
    }

    println!("Trending Searches:");
    println!("{:-<60}", "");

    for (i, counter) in counters.iter().enumerate() {
        println!(
            "{:>2}. {} ({} searches, movie {})",
            i + 1,
            counter.term,
            counter.count,
            counter.movie_id
        );
        if !counter.poster_url.is_empty() {
            println!("    {}", counter.poster_url);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::catalog::testing::{ScriptedCatalog, movie};
    use crate::services::trending::testing::MemoryCounterStore;
    use std::sync::Arc;

    fn state(store: Arc<MemoryCounterStore>) -> SharedState {
        SharedState::with_components(
            Config::default(),
            Arc::new(ScriptedCatalog::default()),
            store,
        )
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error() {
        let store = Arc::new(MemoryCounterStore::default());
        store.fail(true);

        let err = cmd_trending(&state(store)).await.unwrap_err();

        assert_eq!(err.to_string(), TRENDING_FAILED);
    }

    #[tokio::test]
    async fn test_lists_recorded_searches() {
        let store = Arc::new(MemoryCounterStore::default());
        let state = state(store);
        state.trending.record_search("dune", &movie(3, "Dune")).await;

        cmd_trending(&state).await.unwrap();
    }
}
