//! Per-request metrics recording.

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

use crate::observability::metrics;

/// Record a counter and latency histogram for every request, labeled by the
/// matched route template (not the raw path, to keep cardinality bounded).
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let started = Instant::now();
    let response = next.run(request).await;

    metrics::record_request(&method, &route, response.status().as_u16(), started.elapsed());
    response
}
