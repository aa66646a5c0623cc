mod browse;
mod popular;
mod search;
mod trending;

pub use browse::cmd_browse;
pub use popular::cmd_popular;
pub use search::cmd_search;
pub use trending::cmd_trending;

use crate::constants::limits::CLI_RESULTS;
use crate::models::MovieSummary;

fn print_movies(movies: &[MovieSummary], image_base_url: &str) {
    println!("{:-<60}", "");

    for movie in movies.iter().take(CLI_RESULTS) {
        let year = movie.release_year().unwrap_or("????");
        let rating = movie
            .vote_average
            .map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));

        println!("• {} ({})", movie.title, year);
        println!("  ID: {} | Rating: {}", movie.id, rating);

        let poster = movie.poster_url(image_base_url);
        if !poster.is_empty() {
            println!("  Poster: {poster}");
        }
        println!();
    }

    if movies.len() > CLI_RESULTS {
        println!("... and {} more", movies.len() - CLI_RESULTS);
    }
}
