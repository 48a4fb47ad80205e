//! A REST gateway in front of an external astrology computation engine.
//!
//! The gateway validates birth subjects, guards the API behind a shared
//! secret header, proxies city lookups to GeoNames with a daily cache, and
//! shapes engine output into stable JSON envelopes.

pub mod config;
pub mod engine;
pub mod geonames;
pub mod handlers;
pub mod http;
pub mod models;
pub mod observability;
pub mod validation;

pub use config::Settings;
pub use http::{build_router, AppState, HttpServer};
