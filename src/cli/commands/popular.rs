use anyhow::Context;

use crate::constants::messages::FETCH_FAILED;
use crate::state::SharedState;

use super::print_movies;

pub async fn cmd_popular(state: &SharedState) -> anyhow::Result<()> {
    let movies = state
        .dispatcher
        .fetch_movies("")
        .await
        .context(FETCH_FAILED)?;

    println!("Popular Movies:");
    print_movies(&movies, &state.config.catalog.image_base_url);

    Ok(())
}
