use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::services::{CatalogView, SearchSession, TrendingView};
use crate::state::SharedState;

use super::print_movies;

/// How long to wait for an in-flight search once stdin is closed.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads queries from stdin, one per line, and prints every list the
/// session settles on. Typing fast enough only searches the last line.
pub async fn cmd_browse(state: &SharedState) -> anyhow::Result<()> {
    let window = state.config.catalog.debounce_window();
    let session = SearchSession::start(state.dispatcher.clone(), state.trending.clone(), window);
    let image_base_url = state.config.catalog.image_base_url.clone();

    let mut catalog = session.catalog();
    let mut trending = session.trending();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Type a query and press enter. Empty line shows popular movies, Ctrl+D quits.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => session.set_input(line.trim()),
                    None => break,
                }
            }
            changed = catalog.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = catalog.borrow_and_update().clone();
                print_catalog(&view, &image_base_url);
            }
            changed = trending.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = trending.borrow_and_update().clone();
                print_trending(&view);
            }
        }
    }

    // Let the last line settle and its search finish.
    match tokio::time::timeout(window + DRAIN_TIMEOUT, session.settled_view()).await {
        Ok(Some(view)) => print_catalog(&view, &image_base_url),
        Ok(None) => {}
        Err(_) => tracing::warn!("Timed out waiting for the last search"),
    }

    Ok(())
}

fn print_catalog(view: &CatalogView, image_base_url: &str) {
    if view.is_loading {
        println!("Loading...");
        return;
    }

    if let Some(message) = &view.error_message {
        println!("{message}");
        return;
    }

    match view.query.as_deref() {
        Some("") | None => println!("Popular Movies:"),
        Some(query) => println!("Results for '{query}':"),
    }

    if view.movies.is_empty() {
        println!("No movies found.");
    } else {
        print_movies(&view.movies, image_base_url);
    }
}

fn print_trending(view: &TrendingView) {
    if view.is_loading {
        return;
    }

    let terms: Vec<String> = view
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{}. {}", i + 1, e.term))
        .collect();

    if !terms.is_empty() {
        println!("Trending: {}", terms.join("  "));
    }
}
