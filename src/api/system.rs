use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::warn;

use super::{ApiResponse, AppState, HealthDto};

/// Liveness plus a round trip to the search-count store.
///
/// # Endpoint
/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthDto>> {
    let store = match state.shared.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Search-count store health check failed: {}", e);
            false
        }
    };

    Json(ApiResponse::success(HealthDto {
        status: if store { "ok" } else { "degraded" },
        store,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}
