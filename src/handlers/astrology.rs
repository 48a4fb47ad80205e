//! Astrology endpoint handlers.
//!
//! # Responsibilities
//! - Validate and resolve incoming subjects
//! - Drive the engine (subject data, charts, aspects, scores, ephemeris)
//! - Assemble the per-endpoint response envelopes
//!
//! Validation failures never reach the engine; the cheap checks run first.

use axum::extract::State;
use axum::Json;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde_json::{json, Value};

use crate::engine::{AspectsKind, AspectsSpec, ChartSpec, ChartType, EphemerisSpec, SubjectSpec};
use crate::http::response::{ok_envelope, ApiError};
use crate::http::server::AppState;
use crate::models::{
    BirthChartRequest, BirthDataRequest, ChartOptions, EphemerisDataRequest, NatalAspectsRequest,
    PairAspectsRequest, PairChartRequest, RelationshipScoreRequest, SubjectPayload,
    TransitChartRequest,
};
use crate::validation::{resolve_subject, resolve_transit_subject};

/// `GET /` — service status with environment info.
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "environment": state.settings.general.environment,
        "debug": state.settings.general.debug,
    }))
}

/// `GET /api/v4/health`
pub async fn health() -> Json<Value> {
    Json(json!({"status": "OK"}))
}

/// `GET /api/v4/now` — astrological data for the current moment at
/// Greenwich. The wall clock comes from the time source's `Date` header
/// because some hosts have an unreliable system clock.
pub async fn now(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let moment = fetch_current_time(&state).await?;

    let subject = SubjectSpec {
        name: "Now".to_string(),
        year: moment.year(),
        month: moment.month(),
        day: moment.day(),
        hour: moment.hour(),
        minute: moment.minute(),
        city: "GMT".to_string(),
        nation: "UK".to_string(),
        latitude: Some(51.477928),
        longitude: Some(-0.001545),
        timezone: Some("GMT".to_string()),
        geonames_username: None,
        online: false,
        zodiac_type: "Tropic".to_string(),
        sidereal_mode: None,
        houses_system_identifier: "P".to_string(),
        perspective_type: "Apparent Geocentric".to_string(),
    };

    let data = state.engine.compute_subject(&subject).await?;
    Ok(ok_envelope(json!({"data": data})))
}

async fn fetch_current_time(state: &AppState) -> Result<NaiveDateTime, ApiError> {
    let response = state
        .http
        .head(&state.settings.general.time_source_url)
        .send()
        .await
        .map_err(|error| {
            tracing::error!(%error, "Time source unreachable");
            ApiError::Internal
        })?;

    let date_header = response
        .headers()
        .get(reqwest::header::DATE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            tracing::error!("Time source response carried no Date header");
            ApiError::Internal
        })?;

    NaiveDateTime::parse_from_str(date_header, "%a, %d %b %Y %H:%M:%S GMT").map_err(|error| {
        tracing::error!(%error, date_header, "Unparseable Date header from time source");
        ApiError::Internal
    })
}

fn resolve_pair(
    first: &SubjectPayload,
    second: &SubjectPayload,
) -> Result<(SubjectSpec, SubjectSpec), ApiError> {
    let first = resolve_subject(first)?;
    let second = resolve_subject(second)?;
    Ok((first, second))
}

fn chart_spec(
    chart_type: ChartType,
    first: SubjectSpec,
    second: Option<SubjectSpec>,
    options: &ChartOptions,
) -> ChartSpec {
    ChartSpec {
        chart_type,
        first_subject: first,
        second_subject: second,
        theme: options.theme().to_string(),
        language: options.language().to_string(),
        wheel_only: options.wheel_only,
        active_points: options.active_points(),
        active_aspects: options.active_aspects(),
    }
}

fn aspects_spec(
    kind: AspectsKind,
    first: SubjectSpec,
    second: Option<SubjectSpec>,
    options: &ChartOptions,
) -> AspectsSpec {
    AspectsSpec {
        kind,
        first_subject: first,
        second_subject: second,
        active_points: options.active_points(),
        active_aspects: options.active_aspects(),
    }
}

/// Remove the nested source subjects from a composite model; they are
/// reported separately in the envelope.
fn strip_source_subjects(mut composite: Value) -> Value {
    if let Some(map) = composite.as_object_mut() {
        map.remove("first_subject");
        map.remove("second_subject");
    }
    composite
}

/// `POST /api/v4/birth-data` — subject data only, no chart, no aspects.
pub async fn birth_data(
    State(state): State<AppState>,
    Json(body): Json<BirthDataRequest>,
) -> Result<Json<Value>, ApiError> {
    let subject = resolve_subject(&body.subject)?;
    let data = state.engine.compute_subject(&subject).await?;
    Ok(ok_envelope(json!({"data": data})))
}

/// `POST /api/v4/birth-chart` — subject data, chart SVG and aspects.
pub async fn birth_chart(
    State(state): State<AppState>,
    Json(body): Json<BirthChartRequest>,
) -> Result<Json<Value>, ApiError> {
    let subject = resolve_subject(&body.subject)?;
    let data = state.engine.compute_subject(&subject).await?;
    let render = state
        .engine
        .render_chart(&chart_spec(ChartType::Natal, subject, None, &body.options))
        .await?;

    Ok(ok_envelope(json!({
        "chart": render.svg,
        "data": data,
        "aspects": render.aspects,
    })))
}

/// `POST /api/v4/synastry-chart`
pub async fn synastry_chart(
    State(state): State<AppState>,
    Json(body): Json<PairChartRequest>,
) -> Result<Json<Value>, ApiError> {
    let (first, second) = resolve_pair(&body.first_subject, &body.second_subject)?;
    let first_data = state.engine.compute_subject(&first).await?;
    let second_data = state.engine.compute_subject(&second).await?;
    let render = state
        .engine
        .render_chart(&chart_spec(
            ChartType::Synastry,
            first,
            Some(second),
            &body.options,
        ))
        .await?;

    Ok(ok_envelope(json!({
        "chart": render.svg,
        "aspects": render.aspects,
        "data": {
            "first_subject": first_data,
            "second_subject": second_data,
        },
    })))
}

/// `POST /api/v4/transit-chart`
pub async fn transit_chart(
    State(state): State<AppState>,
    Json(body): Json<TransitChartRequest>,
) -> Result<Json<Value>, ApiError> {
    let first = resolve_subject(&body.first_subject)?;
    let transit = resolve_transit_subject(&body.transit_subject, &first)?;
    let first_data = state.engine.compute_subject(&first).await?;
    let transit_data = state.engine.compute_subject(&transit).await?;
    let render = state
        .engine
        .render_chart(&chart_spec(
            ChartType::Transit,
            first,
            Some(transit),
            &body.options,
        ))
        .await?;

    Ok(ok_envelope(json!({
        "chart": render.svg,
        "aspects": render.aspects,
        "data": {
            "subject": first_data,
            "transit": transit_data,
        },
    })))
}

/// `POST /api/v4/composite-chart` — midpoint composite of two subjects.
pub async fn composite_chart(
    State(state): State<AppState>,
    Json(body): Json<PairChartRequest>,
) -> Result<Json<Value>, ApiError> {
    let (first, second) = resolve_pair(&body.first_subject, &body.second_subject)?;
    let first_data = state.engine.compute_subject(&first).await?;
    let second_data = state.engine.compute_subject(&second).await?;
    let composite = state.engine.composite_subject(&first, &second).await?;
    let render = state
        .engine
        .render_chart(&chart_spec(
            ChartType::Composite,
            first,
            Some(second),
            &body.options,
        ))
        .await?;

    Ok(ok_envelope(json!({
        "chart": render.svg,
        "aspects": render.aspects,
        "data": {
            "composite_subject": strip_source_subjects(composite),
            "first_subject": first_data,
            "second_subject": second_data,
        },
    })))
}

/// `POST /api/v4/relationship-score` — Discepolo relationship relevance.
pub async fn relationship_score(
    State(state): State<AppState>,
    Json(body): Json<RelationshipScoreRequest>,
) -> Result<Json<Value>, ApiError> {
    let (first, second) = resolve_pair(&body.first_subject, &body.second_subject)?;
    let first_data = state.engine.compute_subject(&first).await?;
    let second_data = state.engine.compute_subject(&second).await?;
    let score = state.engine.relationship_score(&first, &second).await?;

    Ok(ok_envelope(json!({
        "score": score.score,
        "score_description": score.score_description,
        "is_destiny_sign": score.is_destiny_sign,
        "aspects": score.aspects,
        "data": {
            "first_subject": first_data,
            "second_subject": second_data,
        },
    })))
}

/// `POST /api/v4/natal-aspects-data` — aspects only, no chart.
pub async fn natal_aspects_data(
    State(state): State<AppState>,
    Json(body): Json<NatalAspectsRequest>,
) -> Result<Json<Value>, ApiError> {
    let subject = resolve_subject(&body.subject)?;
    let data = state.engine.compute_subject(&subject).await?;
    let aspects = state
        .engine
        .compute_aspects(&aspects_spec(AspectsKind::Natal, subject, None, &body.options))
        .await?;

    Ok(ok_envelope(json!({
        "data": {"subject": data},
        "aspects": aspects,
    })))
}

/// `POST /api/v4/synastry-aspects-data`
pub async fn synastry_aspects_data(
    State(state): State<AppState>,
    Json(body): Json<PairAspectsRequest>,
) -> Result<Json<Value>, ApiError> {
    let (first, second) = resolve_pair(&body.first_subject, &body.second_subject)?;
    let first_data = state.engine.compute_subject(&first).await?;
    let second_data = state.engine.compute_subject(&second).await?;
    let aspects = state
        .engine
        .compute_aspects(&aspects_spec(
            AspectsKind::Synastry,
            first,
            Some(second),
            &body.options,
        ))
        .await?;

    Ok(ok_envelope(json!({
        "data": {
            "first_subject": first_data,
            "second_subject": second_data,
        },
        "aspects": aspects,
    })))
}

/// `POST /api/v4/transit-aspects-data` — transit aspects are pairwise
/// aspects between the natal subject and the transit moment.
pub async fn transit_aspects_data(
    State(state): State<AppState>,
    Json(body): Json<TransitChartRequest>,
) -> Result<Json<Value>, ApiError> {
    let first = resolve_subject(&body.first_subject)?;
    let transit = resolve_transit_subject(&body.transit_subject, &first)?;
    let first_data = state.engine.compute_subject(&first).await?;
    let transit_data = state.engine.compute_subject(&transit).await?;
    let aspects = state
        .engine
        .compute_aspects(&aspects_spec(
            AspectsKind::Synastry,
            first,
            Some(transit),
            &body.options,
        ))
        .await?;

    Ok(ok_envelope(json!({
        "data": {
            "subject": first_data,
            "transit": transit_data,
        },
        "aspects": aspects,
    })))
}

/// `POST /api/v4/composite-aspects-data`
pub async fn composite_aspects_data(
    State(state): State<AppState>,
    Json(body): Json<PairAspectsRequest>,
) -> Result<Json<Value>, ApiError> {
    let (first, second) = resolve_pair(&body.first_subject, &body.second_subject)?;
    let first_data = state.engine.compute_subject(&first).await?;
    let second_data = state.engine.compute_subject(&second).await?;
    let composite = state.engine.composite_subject(&first, &second).await?;
    let aspects = state
        .engine
        .compute_aspects(&aspects_spec(
            AspectsKind::Composite,
            first,
            Some(second),
            &body.options,
        ))
        .await?;

    Ok(ok_envelope(json!({
        "data": {
            "composite_subject": strip_source_subjects(composite),
            "first_subject": first_data,
            "second_subject": second_data,
        },
        "aspects": aspects,
    })))
}

/// `POST /api/v4/ephemeris-data` — planetary positions over a date range.
/// Range caps are enforced here so oversized requests never reach the
/// engine.
pub async fn ephemeris_data(
    State(state): State<AppState>,
    Json(body): Json<EphemerisDataRequest>,
) -> Result<Json<Value>, ApiError> {
    let start = parse_iso_datetime(&body.start_date)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid start_date '{}'.", body.start_date)))?;
    let end = parse_iso_datetime(&body.end_date)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid end_date '{}'.", body.end_date)))?;

    if end < start {
        return Err(ApiError::BadRequest(
            "end_date must not precede start_date.".to_string(),
        ));
    }

    // An explicit null cap disables the check for that step type; the serde
    // default only fills in absent fields.
    let span = end - start;
    match body.step_type.as_str() {
        "days" => {
            if let Some(max) = body.max_days {
                if span.num_days() > i64::from(max) {
                    return Err(ApiError::BadRequest(format!(
                        "Date range too large for step type 'days' (max: {max} days)."
                    )));
                }
            }
        }
        "hours" => {
            if let Some(max) = body.max_hours {
                if span.num_hours() > i64::from(max) {
                    return Err(ApiError::BadRequest(format!(
                        "Date range too large for step type 'hours' (max: {max} hours)."
                    )));
                }
            }
        }
        "minutes" => {
            if let Some(max) = body.max_minutes {
                if span.num_minutes() > i64::from(max) {
                    return Err(ApiError::BadRequest(format!(
                        "Date range too large for step type 'minutes' (max: {max} minutes)."
                    )));
                }
            }
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "Invalid step_type '{other}'. Please use 'days', 'hours' or 'minutes'."
            )));
        }
    }

    let spec = EphemerisSpec {
        start,
        end,
        step_type: body.step_type,
        step: body.step,
        latitude: body.latitude,
        longitude: body.longitude,
        timezone: body.timezone,
        is_dst: body.is_dst,
        disable_chiron_and_lilith: body.disable_chiron_and_lilith,
        zodiac_type: body.zodiac_type.unwrap_or_else(|| "Tropic".to_string()),
        sidereal_mode: body.sidereal_mode,
        houses_system_identifier: body
            .houses_system_identifier
            .unwrap_or_else(|| "P".to_string()),
        perspective_type: body
            .perspective_type
            .unwrap_or_else(|| "Apparent Geocentric".to_string()),
        format: body.format,
    };

    let data = state.engine.ephemeris_range(&spec).await?;
    Ok(ok_envelope(json!({"data": data})))
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_datetimes_parse_with_and_without_time() {
        assert!(parse_iso_datetime("2023-01-01T12:30:00").is_some());
        assert!(parse_iso_datetime("2023-01-01").is_some());
        assert!(parse_iso_datetime("January 1st").is_none());
    }

    #[test]
    fn composite_source_subjects_are_stripped() {
        let composite = json!({
            "name": "Composite",
            "first_subject": {"name": "a"},
            "second_subject": {"name": "b"},
        });
        let stripped = strip_source_subjects(composite);
        assert!(stripped.get("first_subject").is_none());
        assert!(stripped.get("second_subject").is_none());
        assert_eq!(stripped["name"], "Composite");
    }

    #[test]
    fn date_header_format_parses() {
        let parsed =
            NaiveDateTime::parse_from_str("Wed, 27 Aug 2025 10:15:30 GMT", "%a, %d %b %Y %H:%M:%S GMT")
                .unwrap();
        assert_eq!(chrono::Datelike::year(&parsed), 2025);
        assert_eq!(chrono::Timelike::hour(&parsed), 10);
    }
}
