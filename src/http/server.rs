//! Router assembly and server lifecycle.
//!
//! # Data Flow
//! ```text
//! TCP accept
//!     → request-id + trace + timeout + body-limit layers
//!     → secret gate (middleware::secret_gate)
//!     → route dispatch (handlers::*)
//!     → JSON envelope out
//! ```
//!
//! # Design Decisions
//! - All shared state travels in one cloned `AppState`; nothing is ambient
//! - The router is built by a free function so integration tests can drive
//!   it without binding a socket

use axum::extract::Request;
use axum::http::HeaderName;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::engine::AstrologyEngine;
use crate::geonames::GeonamesClient;
use crate::handlers;
use crate::http::middleware::{secret_gate, track_requests};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub engine: Arc<dyn AstrologyEngine>,
    pub geonames: GeonamesClient,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(
        settings: Arc<Settings>,
        engine: Arc<dyn AstrologyEngine>,
        geonames: GeonamesClient,
        http: reqwest::Client,
    ) -> Self {
        Self {
            settings,
            engine,
            geonames,
            http,
        }
    }
}

/// Build the full application router with all middleware layers applied.
pub fn build_router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_timeout = Duration::from_secs(state.settings.timeouts.request_secs);
    let max_body_bytes = state.settings.listener.max_body_bytes;

    Router::new()
        .route("/", get(handlers::astrology::status))
        .route("/api/v4/health", get(handlers::astrology::health))
        .route("/api/v4/now", get(handlers::astrology::now))
        .route("/api/v4/birth-data", post(handlers::astrology::birth_data))
        .route("/api/v4/birth-chart", post(handlers::astrology::birth_chart))
        .route(
            "/api/v4/synastry-chart",
            post(handlers::astrology::synastry_chart),
        )
        .route(
            "/api/v4/transit-chart",
            post(handlers::astrology::transit_chart),
        )
        .route(
            "/api/v4/composite-chart",
            post(handlers::astrology::composite_chart),
        )
        .route(
            "/api/v4/relationship-score",
            post(handlers::astrology::relationship_score),
        )
        .route(
            "/api/v4/natal-aspects-data",
            post(handlers::astrology::natal_aspects_data),
        )
        .route(
            "/api/v4/synastry-aspects-data",
            post(handlers::astrology::synastry_aspects_data),
        )
        .route(
            "/api/v4/transit-aspects-data",
            post(handlers::astrology::transit_aspects_data),
        )
        .route(
            "/api/v4/composite-aspects-data",
            post(handlers::astrology::composite_aspects_data),
        )
        .route(
            "/api/v4/ephemeris-data",
            post(handlers::astrology::ephemeris_data),
        )
        .route("/api/v1/city-data", post(handlers::geonames::city_data))
        // Gate rejections still pass through the metrics layer on the way
        // out, so 400s stay visible in http_requests_total.
        .layer(from_fn_with_state(state.clone(), secret_gate))
        .layer(from_fn(track_requests))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    request_id_header.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(request_id_header))
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    }),
                )
                // Body limit sits outside the timeout: tower-http's Timeout
                // needs a Default response body underneath it.
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

/// The HTTP server: router plus lifecycle management.
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Serve until SIGINT or SIGTERM arrives, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener) -> std::io::Result<()> {
        let router = build_router(self.state);
        let address = listener.local_addr()?;
        tracing::info!(%address, "Gateway listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => tracing::error!(%error, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
