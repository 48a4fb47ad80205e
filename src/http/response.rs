//! Response envelopes and the API error type.
//!
//! # Responsibilities
//! - Success envelopes carrying `"status": "OK"` plus endpoint data
//! - A single `ApiError` implementing `IntoResponse` so handlers return
//!   `Result<_, ApiError>` everywhere
//!
//! # Design Decisions
//! - Engine failure details are logged but never leaked; clients get a fixed
//!   `"Internal Server Error"` message
//! - Geocoding failures get one fixed advisory message so callers can fix
//!   their request without guessing

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::engine::EngineError;
use crate::geonames::GeonamesError;
use crate::observability::metrics;
use crate::validation::FieldError;

/// Advisory returned whenever geocoding resolution fails.
pub const GEONAMES_ADVISORY: &str = "City/Nation name error or invalid GeoNames username. \
    Please check your username or city name and try again. \
    You can create a free username here: https://www.geonames.org/login/. \
    If you want to bypass the usage of GeoNames, please remove the geonames_username field \
    from the request. Note: The nation field should be the country code \
    (e.g. US, UK, FR, DE, etc.).";

/// Build a success envelope: `{"status": "OK", ...fields}`.
pub fn ok_envelope(fields: Value) -> Json<Value> {
    let mut body = json!({"status": "OK"});
    if let (Some(map), Some(extra)) = (body.as_object_mut(), fields.as_object()) {
        for (k, v) in extra {
            map.insert(k.clone(), v.clone());
        }
    }
    Json(body)
}

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    /// Input validation failed; all offending fields reported together.
    Validation(Vec<FieldError>),

    /// Geocoding resolution found nothing; fixed advisory message.
    Geocoding,

    /// The request was judged invalid beyond field validation.
    BadRequest(String),

    /// Anything else. The detail is logged, not returned.
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "status": "KO",
                    "message": "Validation failed",
                    "errors": errors,
                })),
            )
                .into_response(),
            ApiError::Geocoding => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "KO",
                    "message": GEONAMES_ADVISORY,
                })),
            )
                .into_response(),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "KO",
                    "message": message,
                })),
            )
                .into_response(),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "KO",
                    "message": "Internal Server Error",
                })),
            )
                .into_response(),
        }
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NoGeocodingData => {
                metrics::record_engine_error("geocoding");
                ApiError::Geocoding
            }
            EngineError::Rejected(message) => {
                metrics::record_engine_error("rejected");
                ApiError::BadRequest(message)
            }
            err => {
                metrics::record_engine_error("upstream");
                tracing::error!(error = %err, "Engine failure");
                ApiError::Internal
            }
        }
    }
}

impl From<GeonamesError> for ApiError {
    fn from(err: GeonamesError) -> Self {
        match err {
            GeonamesError::NoUsername => {
                ApiError::BadRequest("No GeoNames username configured".to_string())
            }
            err => {
                tracing::error!(error = %err, "City lookup failure");
                ApiError::Internal
            }
        }
    }
}
