use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MovieDto, MovieListDto};

/// Longest query forwarded to the catalog.
const MAX_QUERY_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    #[serde(default)]
    pub query: String,
}

/// Searches the catalog, or lists popular movies when `query` is empty.
///
/// # Endpoint
/// `GET /api/movies?query=`
///
/// A search with results counts toward the trending list.
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MoviesQuery>,
) -> Result<Json<ApiResponse<MovieListDto>>, ApiError> {
    if params.query.chars().count() > MAX_QUERY_CHARS {
        return Err(ApiError::validation(format!(
            "Query must be at most {MAX_QUERY_CHARS} characters"
        )));
    }

    let movies = state.shared.dispatcher.fetch_movies(&params.query).await?;
    let image_base_url = &state.shared.config.catalog.image_base_url;

    let results = movies
        .into_iter()
        .map(|movie| MovieDto::from_summary(movie, image_base_url))
        .collect();

    Ok(Json(ApiResponse::success(MovieListDto {
        query: params.query,
        results,
    })))
}
