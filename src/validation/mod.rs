//! Subject input validation.
//!
//! # Responsibilities
//! - Field-level range and format checks, each independent, each naming the
//!   offending field and the valid range
//! - Cross-field coordinate-completeness rule, run only after every field
//!   check has passed
//! - Resolution of raw payloads into engine-ready `SubjectSpec` values
//!
//! # Design Decisions
//! - All field failures are collected and reported together
//! - When a geocoding username is present, explicit coordinates are
//!   discarded: geocoding resolution wins
//! - February allows day 29 unconditionally; the engine owns real calendar
//!   math

use std::fmt;

use crate::engine::types::SubjectSpec;
use crate::models::{BirthFields, SubjectPayload, TransitSubjectPayload};

/// Sentinel nation value used when none is supplied.
pub const NATION_UNKNOWN: &str = "unknown";

const DEFAULT_ZODIAC_TYPE: &str = "Tropic";
const DEFAULT_HOUSES_SYSTEM: &str = "P";
const DEFAULT_PERSPECTIVE: &str = "Apparent Geocentric";

const HOUSES_SYSTEM_IDENTIFIERS: &[&str] = &[
    "A", "B", "C", "D", "F", "H", "I", "i", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T",
    "U", "V", "W", "X", "Y",
];

const PERSPECTIVE_TYPES: &[&str] = &[
    "Apparent Geocentric",
    "Heliocentric",
    "Topocentric",
    "True Geocentric",
];

/// A single validation failure, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// How the subject's location is resolved.
#[derive(Debug, Clone, PartialEq)]
enum Location {
    /// Explicit coordinates and timezone; no geocoding.
    Explicit {
        latitude: f64,
        longitude: f64,
        timezone: String,
    },
    /// Geocoding resolution via the given username.
    Geocoded { username: String },
}

/// Run all field-level checks on the shared birth fields.
fn check_birth_fields(birth: &BirthFields, errors: &mut Vec<FieldError>) {
    if !(1800..=2100).contains(&birth.year) {
        errors.push(FieldError::new(
            "year",
            format!(
                "Invalid year '{}'. Please use a value between 1800 and 2100.",
                birth.year
            ),
        ));
    }

    let month_valid = (1..=12).contains(&birth.month);
    if !month_valid {
        errors.push(FieldError::new(
            "month",
            format!(
                "Invalid month '{}'. Please use a value between 1 and 12.",
                birth.month
            ),
        ));
    }

    if month_valid {
        let max_day = match birth.month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ => 29,
        };
        if !(1..=max_day).contains(&birth.day) {
            errors.push(FieldError::new(
                "day",
                format!(
                    "Invalid day '{}'. Please use a value between 1 and {max_day}.",
                    birth.day
                ),
            ));
        }
    }

    if birth.hour > 23 {
        errors.push(FieldError::new(
            "hour",
            format!(
                "Invalid hour '{}'. Please use a value between 0 and 23.",
                birth.hour
            ),
        ));
    }

    if birth.minute > 59 {
        errors.push(FieldError::new(
            "minute",
            format!(
                "Invalid minute '{}'. Please use a value between 0 and 59.",
                birth.minute
            ),
        ));
    }

    if let Some(longitude) = birth.longitude {
        if !(-180.0..=180.0).contains(&longitude) {
            errors.push(FieldError::new(
                "longitude",
                format!("Invalid longitude '{longitude}'. Please use a value between -180 and 180."),
            ));
        }
    }

    if let Some(latitude) = birth.latitude {
        if !(-90.0..=90.0).contains(&latitude) {
            errors.push(FieldError::new(
                "latitude",
                format!("Invalid latitude '{latitude}'. Please use a value between -90 and 90."),
            ));
        }
    }

    if let Some(timezone) = birth.timezone.as_deref() {
        if timezone.parse::<chrono_tz::Tz>().is_err() {
            errors.push(FieldError::new(
                "timezone",
                format!("Invalid timezone '{timezone}'. Please use a valid IANA timezone identifier."),
            ));
        }
    }

    if let Some(nation) = birth.nation.as_deref() {
        let normalized_ok = nation.is_empty()
            || nation == NATION_UNKNOWN
            || (nation.len() == 2 && nation.chars().all(|c| c.is_ascii_alphabetic()));
        if !normalized_ok {
            errors.push(FieldError::new(
                "nation",
                format!(
                    "Invalid nation code '{nation}'. It must be a 2-letter country code \
                     following the ISO 3166-1 alpha-2 standard."
                ),
            ));
        }
    }
}

/// Check the astrological settings of a full subject.
fn check_subject_settings(subject: &SubjectPayload, errors: &mut Vec<FieldError>) {
    let zodiac = subject.zodiac_type.as_deref().unwrap_or(DEFAULT_ZODIAC_TYPE);
    if zodiac != "Tropic" && zodiac != "Sidereal" {
        errors.push(FieldError::new(
            "zodiac_type",
            format!("Invalid zodiac_type '{zodiac}'. Please use 'Tropic' or 'Sidereal'."),
        ));
    }

    if subject.sidereal_mode.is_some() && zodiac != "Sidereal" {
        errors.push(FieldError::new(
            "sidereal_mode",
            "sidereal_mode requires zodiac_type 'Sidereal'.",
        ));
    }

    if let Some(houses) = subject.houses_system_identifier.as_deref() {
        if !HOUSES_SYSTEM_IDENTIFIERS.contains(&houses) {
            errors.push(FieldError::new(
                "houses_system_identifier",
                format!("Invalid houses_system_identifier '{houses}'."),
            ));
        }
    }

    if let Some(perspective) = subject.perspective_type.as_deref() {
        if !PERSPECTIVE_TYPES.contains(&perspective) {
            errors.push(FieldError::new(
                "perspective_type",
                format!("Invalid perspective_type '{perspective}'."),
            ));
        }
    }
}

/// The coordinate-completeness rule. Runs only once all field checks passed.
fn resolve_location(birth: &BirthFields) -> Result<Location, FieldError> {
    let latitude = birth.latitude;
    let longitude = birth.longitude;
    let timezone = birth.timezone.clone();
    let username = birth
        .geonames_username
        .as_deref()
        .filter(|u| !u.is_empty())
        .map(ToString::to_string);

    let set_count = [
        latitude.is_some(),
        longitude.is_some(),
        timezone.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();

    match (set_count, username) {
        // Geocoding wins: explicit values (if any) are discarded.
        (_, Some(username)) => Ok(Location::Geocoded { username }),
        (3, None) => Ok(Location::Explicit {
            latitude: latitude.unwrap_or_default(),
            longitude: longitude.unwrap_or_default(),
            timezone: timezone.unwrap_or_default(),
        }),
        (0, None) => Err(FieldError::new(
            "subject",
            "Either provide latitude, longitude and timezone, or specify geonames_username.",
        )),
        (_, None) => Err(FieldError::new(
            "subject",
            "Please provide all of latitude, longitude and timezone, or specify \
             geonames_username.",
        )),
    }
}

fn normalized_nation(birth: &BirthFields) -> String {
    match birth.nation.as_deref() {
        None | Some("") => NATION_UNKNOWN.to_string(),
        Some(nation) => nation.to_string(),
    }
}

fn build_spec(
    name: String,
    birth: &BirthFields,
    location: Location,
    zodiac_type: String,
    sidereal_mode: Option<String>,
    houses_system_identifier: String,
    perspective_type: String,
) -> SubjectSpec {
    let (latitude, longitude, timezone, geonames_username, online) = match location {
        Location::Explicit {
            latitude,
            longitude,
            timezone,
        } => (Some(latitude), Some(longitude), Some(timezone), None, false),
        Location::Geocoded { username } => (None, None, None, Some(username), true),
    };

    SubjectSpec {
        name,
        year: birth.year,
        month: birth.month,
        day: birth.day,
        hour: birth.hour,
        minute: birth.minute,
        city: birth.city.clone(),
        nation: normalized_nation(birth),
        latitude,
        longitude,
        timezone,
        geonames_username,
        online,
        zodiac_type,
        sidereal_mode,
        houses_system_identifier,
        perspective_type,
    }
}

/// Validate a full subject payload and resolve it into a `SubjectSpec`.
pub fn resolve_subject(payload: &SubjectPayload) -> Result<SubjectSpec, Vec<FieldError>> {
    let mut errors = Vec::new();
    check_birth_fields(&payload.birth, &mut errors);
    check_subject_settings(payload, &mut errors);
    if !errors.is_empty() {
        return Err(errors);
    }

    let location = resolve_location(&payload.birth).map_err(|e| vec![e])?;

    Ok(build_spec(
        payload.name.clone(),
        &payload.birth,
        location,
        payload
            .zodiac_type
            .clone()
            .unwrap_or_else(|| DEFAULT_ZODIAC_TYPE.to_string()),
        payload.sidereal_mode.clone(),
        payload
            .houses_system_identifier
            .clone()
            .unwrap_or_else(|| DEFAULT_HOUSES_SYSTEM.to_string()),
        payload
            .perspective_type
            .clone()
            .unwrap_or_else(|| DEFAULT_PERSPECTIVE.to_string()),
    ))
}

/// Validate a transit subject and resolve it, inheriting the astrological
/// settings of the primary subject. The transit point is always named
/// "Transit".
pub fn resolve_transit_subject(
    payload: &TransitSubjectPayload,
    primary: &SubjectSpec,
) -> Result<SubjectSpec, Vec<FieldError>> {
    let mut errors = Vec::new();
    check_birth_fields(&payload.birth, &mut errors);
    if !errors.is_empty() {
        return Err(errors);
    }

    let location = resolve_location(&payload.birth).map_err(|e| vec![e])?;

    Ok(build_spec(
        "Transit".to_string(),
        &payload.birth,
        location,
        primary.zodiac_type.clone(),
        primary.sidereal_mode.clone(),
        primary.houses_system_identifier.clone(),
        primary.perspective_type.clone(),
    ))
}
