use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiResponse, AppState, TrendingEntryDto};

/// Most searched terms, highest count first. An unreachable store yields
/// an empty list.
///
/// # Endpoint
/// `GET /api/trending`
pub async fn list_trending(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<TrendingEntryDto>>> {
    let counters = state.shared.trending.list_trending().await;
    Json(ApiResponse::success(TrendingEntryDto::ranked(counters)))
}
