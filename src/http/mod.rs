//! HTTP surface: router, middleware, response envelopes.

pub mod middleware;
pub mod response;
pub mod server;

pub use response::{ok_envelope, ApiError, GEONAMES_ADVISORY};
pub use server::{build_router, AppState, HttpServer};
