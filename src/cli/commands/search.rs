use anyhow::Context;

use crate::constants::messages::FETCH_FAILED;
use crate::state::SharedState;

use super::print_movies;

pub async fn cmd_search(state: &SharedState, query: &str) -> anyhow::Result<()> {
    println!("Searching for: {query}");

    let movies = state
        .dispatcher
        .fetch_movies(query)
        .await
        .context(FETCH_FAILED)?;

    if movies.is_empty() {
        println!("No movies found matching '{query}'");
        return Ok(());
    }

    println!();
    println!("Search Results:");
    print_movies(&movies, &state.config.catalog.image_base_url);

    Ok(())
}
