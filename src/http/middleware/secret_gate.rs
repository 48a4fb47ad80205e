//! Shared-secret header gate.
//!
//! # Responsibilities
//! - Compare a configured request header against an allow-list of secrets
//! - Reject mismatches with a 400 KO envelope before any handler runs
//!
//! # Design Decisions
//! - The header value is split at the first ':' and only the part before it
//!   is compared, so proxies may append routing metadata after the secret
//! - An unconfigured gate passes everything through. That degraded mode is
//!   deliberate for local development and is logged at ERROR level at startup

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::http::server::AppState;

/// Gate middleware. Installed with `axum::middleware::from_fn_with_state`.
pub async fn secret_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let gate = &state.settings.gate;
    if !gate.is_configured() {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(&gate.header_name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("");

    if gate.secret_keys.iter().any(|key| key == presented) {
        next.run(request).await
    } else {
        tracing::warn!(
            path = %request.uri().path(),
            "Rejected request with missing or invalid gate secret"
        );
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "KO", "message": "Bad request"})),
        )
            .into_response()
    }
}
