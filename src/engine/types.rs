//! Engine-facing types and error definitions.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::ActiveAspect;

/// Marker looked for in engine error messages to recognize failed geocoding
/// resolution (bad city name or GeoNames username).
pub const GEOCODING_ERROR_MARKER: &str = "data found for this city";

/// A fully resolved birth subject, ready to hand to the engine.
///
/// Invariant (enforced by `validation::resolve_subject`): either all of
/// latitude/longitude/timezone are set and `online` is false, or none are set,
/// `geonames_username` is set, and `online` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSpec {
    pub name: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub city: String,
    pub nation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geonames_username: Option<String>,
    /// Whether the engine should resolve the location via geocoding.
    pub online: bool,
    pub zodiac_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidereal_mode: Option<String>,
    pub houses_system_identifier: String,
    pub perspective_type: String,
}

/// Chart variants the renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    Natal,
    Synastry,
    Transit,
    Composite,
}

/// A chart rendering request: one or two subjects plus presentation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub first_subject: SubjectSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_subject: Option<SubjectSpec>,
    pub theme: String,
    pub language: String,
    pub wheel_only: bool,
    pub active_points: Vec<String>,
    pub active_aspects: Vec<ActiveAspect>,
}

/// Aspect computation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectsKind {
    Natal,
    Synastry,
    Composite,
}

/// An aspects-only computation request (no SVG).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AspectsSpec {
    pub kind: AspectsKind,
    pub first_subject: SubjectSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_subject: Option<SubjectSpec>,
    pub active_points: Vec<String>,
    pub active_aspects: Vec<ActiveAspect>,
}

/// A rendered chart: SVG text plus the aspects drawn in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRender {
    pub svg: String,
    pub aspects: Vec<Value>,
}

/// Relationship relevance per the Discepolo method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipScore {
    pub score: f64,
    pub score_description: String,
    pub is_destiny_sign: bool,
    pub aspects: Vec<Value>,
}

/// An ephemeris range request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemerisSpec {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub step_type: String,
    pub step: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub is_dst: bool,
    pub disable_chiron_and_lilith: bool,
    pub zodiac_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidereal_mode: Option<String>,
    pub houses_system_identifier: String,
    pub perspective_type: String,
    pub format: String,
}

/// Errors surfaced by the astrology engine collaborator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Geocoding resolution found nothing for the requested city/username.
    #[error("no geocoding data found for the requested city")]
    NoGeocodingData,

    /// The engine judged the request invalid (e.g. ephemeris range too large).
    #[error("engine rejected request: {0}")]
    Rejected(String),

    /// The engine answered with a server-side failure.
    #[error("engine failure: {0}")]
    Upstream(String),

    /// The HTTP call itself failed (connect, timeout, body).
    #[error("engine request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The engine answered 2xx but the payload did not parse.
    #[error("engine returned malformed payload: {0}")]
    Malformed(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Classify an upstream error message, recognizing geocoding failures by
/// their marker substring.
pub fn classify_engine_message(client_error: bool, message: String) -> EngineError {
    if message.to_lowercase().contains(GEOCODING_ERROR_MARKER) {
        EngineError::NoGeocodingData
    } else if client_error {
        EngineError::Rejected(message)
    } else {
        EngineError::Upstream(message)
    }
}
