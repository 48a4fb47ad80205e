//! Gateway entry point.
//!
//! ```text
//!     Client Request
//!         → secret gate (shared-secret header, fail-open when unconfigured)
//!         → validation (field checks, coordinate-completeness rule)
//!         → astrology engine / GeoNames proxy
//!         → JSON envelope response
//! ```

use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use astro_gateway::config;
use astro_gateway::engine::RemoteEngine;
use astro_gateway::geonames::GeonamesClient;
use astro_gateway::{AppState, HttpServer};

#[derive(Debug, Parser)]
#[command(name = "astro-gateway", about = "REST gateway for astrological computations")]
struct Args {
    /// Directory holding the per-environment TOML profiles.
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Profile to load (dev, test, prod). Overrides ASTRO_ENV.
    #[arg(long)]
    env: Option<String>,

    /// Bind address override (e.g. 127.0.0.1:3000).
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "astro_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_dir = Path::new(&args.config_dir);
    let mut settings = match &args.env {
        Some(profile) => config::load_profile(config_dir, profile)?,
        None => config::load_from_env(config_dir)?,
    };
    if let Some(bind) = args.bind {
        settings.listener.bind_address = bind;
    }

    tracing::info!(
        environment = %settings.general.environment,
        bind_address = %settings.listener.bind_address,
        engine_url = %settings.engine.base_url,
        "Configuration loaded"
    );

    if !settings.gate.is_configured() {
        tracing::error!(
            "Secret gate is not configured; ALL requests will pass through unauthenticated"
        );
    }

    if settings.observability.metrics_enabled {
        match settings.observability.metrics_address.parse() {
            Ok(address) => astro_gateway::observability::metrics::init_metrics(address)?,
            Err(error) => tracing::error!(
                %error,
                metrics_address = %settings.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let http = reqwest::Client::new();
    let settings = Arc::new(settings);
    let engine = Arc::new(RemoteEngine::new(http.clone(), &settings.engine));
    let geonames = GeonamesClient::new(http.clone(), &settings.geonames);

    let listener = TcpListener::bind(&settings.listener.bind_address).await?;
    let state = AppState::new(settings, engine, geonames, http);

    HttpServer::new(state).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
