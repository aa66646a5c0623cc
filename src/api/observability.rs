use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::api::AppState;

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.prometheus_handle {
        Some(handle) => handle.render(),
        None => "Metrics not enabled or failed to initialize".to_string(),
    }
}

const fn outcome(status: u16) -> &'static str {
    match status {
        500.. => "error",
        400..=499 => "client_error",
        _ => "success",
    }
}

/// Wraps each request in a span tagged with a fresh request id, echoes the
/// id back in `x-request-id` and records request count and latency.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().as_str().to_owned();

    // Label by route template so `/api/movies?query=...` stays one series.
    let route = req.extensions().get::<MatchedPath>().map_or_else(
        || req.uri().path().to_owned(),
        |path| path.as_str().to_owned(),
    );

    let span = info_span!("request", %request_id, %method, %route);

    let mut response = next.run(req).instrument(span.clone()).await;

    let status = response.status().as_u16();
    let elapsed = started.elapsed();

    let labels = [
        ("method", method),
        ("path", route),
        ("status", status.to_string()),
    ];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(elapsed.as_secs_f64());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID.clone(), value);
    }

    span.in_scope(|| {
        info!(
            status,
            outcome = outcome(status),
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Request finished"
        );
    });

    response
}
