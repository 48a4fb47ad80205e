//! Request body shapes for the JSON API.
//!
//! Deserialization only checks shape; value ranges and cross-field rules are
//! enforced by the `validation` module before anything reaches the engine.

use serde::{Deserialize, Serialize};

/// Active points used when a request does not name its own.
pub const DEFAULT_ACTIVE_POINTS: &[&str] = &[
    "Sun",
    "Moon",
    "Mercury",
    "Venus",
    "Mars",
    "Jupiter",
    "Saturn",
    "Uranus",
    "Neptune",
    "Pluto",
    "Mean_Node",
    "Chiron",
    "Ascendant",
    "Medium_Coeli",
    "Mean_Lilith",
    "Mean_South_Node",
];

/// Aspect types (and orbs) used when a request does not name its own.
pub fn default_active_aspects() -> Vec<ActiveAspect> {
    [
        ("conjunction", 10.0),
        ("opposition", 10.0),
        ("trine", 8.0),
        ("sextile", 6.0),
        ("square", 5.0),
        ("quintile", 1.0),
    ]
    .iter()
    .map(|(name, orb)| ActiveAspect {
        name: (*name).to_string(),
        orb: *orb,
    })
    .collect()
}

/// An aspect type with its maximum orb in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveAspect {
    pub name: String,
    pub orb: f64,
}

/// Birth-event fields shared by full and transit subjects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BirthFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub city: String,
    #[serde(default)]
    pub nation: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub geonames_username: Option<String>,
}

/// A full birth subject with astrological settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectPayload {
    pub name: String,
    #[serde(flatten)]
    pub birth: BirthFields,
    #[serde(default)]
    pub zodiac_type: Option<String>,
    #[serde(default)]
    pub sidereal_mode: Option<String>,
    #[serde(default)]
    pub houses_system_identifier: Option<String>,
    #[serde(default)]
    pub perspective_type: Option<String>,
}

/// A transit point in time and place. No name, no astrological settings:
/// those are inherited from the primary subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitSubjectPayload {
    #[serde(flatten)]
    pub birth: BirthFields,
}

/// Chart rendering options shared by all chart endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub wheel_only: bool,
    #[serde(default)]
    pub active_points: Option<Vec<String>>,
    #[serde(default)]
    pub active_aspects: Option<Vec<ActiveAspect>>,
}

impl ChartOptions {
    /// Theme, falling back to the classic chart style.
    pub fn theme(&self) -> &str {
        self.theme.as_deref().unwrap_or("classic")
    }

    /// Chart language, falling back to English.
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("EN")
    }

    /// Active points, falling back to the default set.
    pub fn active_points(&self) -> Vec<String> {
        match &self.active_points {
            Some(points) => points.clone(),
            None => DEFAULT_ACTIVE_POINTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Active aspects, falling back to the default set.
    pub fn active_aspects(&self) -> Vec<ActiveAspect> {
        match &self.active_aspects {
            Some(aspects) => aspects.clone(),
            None => default_active_aspects(),
        }
    }
}

/// `POST /api/v4/birth-data`
#[derive(Debug, Clone, Deserialize)]
pub struct BirthDataRequest {
    pub subject: SubjectPayload,
}

/// `POST /api/v4/birth-chart`
#[derive(Debug, Clone, Deserialize)]
pub struct BirthChartRequest {
    pub subject: SubjectPayload,
    #[serde(flatten)]
    pub options: ChartOptions,
}

/// `POST /api/v4/synastry-chart` and `/api/v4/composite-chart`
#[derive(Debug, Clone, Deserialize)]
pub struct PairChartRequest {
    pub first_subject: SubjectPayload,
    pub second_subject: SubjectPayload,
    #[serde(flatten)]
    pub options: ChartOptions,
}

/// `POST /api/v4/transit-chart` and `/api/v4/transit-aspects-data`
#[derive(Debug, Clone, Deserialize)]
pub struct TransitChartRequest {
    pub first_subject: SubjectPayload,
    pub transit_subject: TransitSubjectPayload,
    #[serde(flatten)]
    pub options: ChartOptions,
}

/// `POST /api/v4/relationship-score`
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipScoreRequest {
    pub first_subject: SubjectPayload,
    pub second_subject: SubjectPayload,
}

/// `POST /api/v4/natal-aspects-data`
#[derive(Debug, Clone, Deserialize)]
pub struct NatalAspectsRequest {
    pub subject: SubjectPayload,
    #[serde(flatten)]
    pub options: ChartOptions,
}

/// `POST /api/v4/synastry-aspects-data` and `/api/v4/composite-aspects-data`
#[derive(Debug, Clone, Deserialize)]
pub struct PairAspectsRequest {
    pub first_subject: SubjectPayload,
    pub second_subject: SubjectPayload,
    #[serde(flatten)]
    pub options: ChartOptions,
}

/// `POST /api/v4/ephemeris-data`
#[derive(Debug, Clone, Deserialize)]
pub struct EphemerisDataRequest {
    /// Start of the range, ISO format (e.g. 2023-01-01T00:00:00).
    pub start_date: String,
    /// End of the range, ISO format.
    pub end_date: String,
    #[serde(default = "default_step_type")]
    pub step_type: String,
    #[serde(default = "default_step")]
    pub step: u32,
    #[serde(default = "default_ephemeris_latitude")]
    pub latitude: f64,
    #[serde(default = "default_ephemeris_longitude")]
    pub longitude: f64,
    #[serde(default = "default_ephemeris_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub is_dst: bool,
    #[serde(default)]
    pub disable_chiron_and_lilith: bool,
    #[serde(default)]
    pub zodiac_type: Option<String>,
    #[serde(default)]
    pub sidereal_mode: Option<String>,
    #[serde(default)]
    pub houses_system_identifier: Option<String>,
    #[serde(default)]
    pub perspective_type: Option<String>,
    /// Range cap for step type "days". An explicit null disables the cap;
    /// an absent field gets the default.
    #[serde(default = "default_max_days")]
    pub max_days: Option<u32>,
    /// Range cap for step type "hours"; explicit null disables it.
    #[serde(default = "default_max_hours")]
    pub max_hours: Option<u32>,
    /// Range cap for step type "minutes"; explicit null disables it.
    #[serde(default = "default_max_minutes")]
    pub max_minutes: Option<u32>,
    #[serde(default = "default_ephemeris_format")]
    pub format: String,
}

fn default_step_type() -> String {
    "days".to_string()
}

fn default_step() -> u32 {
    1
}

fn default_ephemeris_latitude() -> f64 {
    51.4769
}

fn default_ephemeris_longitude() -> f64 {
    0.0005
}

fn default_ephemeris_timezone() -> String {
    "Etc/UTC".to_string()
}

fn default_max_days() -> Option<u32> {
    Some(730)
}

fn default_max_hours() -> Option<u32> {
    Some(8760)
}

fn default_max_minutes() -> Option<u32> {
    Some(525_600)
}

fn default_ephemeris_format() -> String {
    "json".to_string()
}

/// `POST /api/v1/city-data`
#[derive(Debug, Clone, Deserialize)]
pub struct CityQuery {
    /// City name or its initial letters.
    pub city: String,
    /// Two-letter country code.
    pub country: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_deserializes_with_flattened_birth_fields() {
        let payload: SubjectPayload = serde_json::from_str(
            r#"{
                "name": "John Doe",
                "year": 1980, "month": 12, "day": 12,
                "hour": 12, "minute": 12,
                "city": "London",
                "latitude": 51.4825766, "longitude": -0.0076589,
                "timezone": "Europe/London"
            }"#,
        )
        .unwrap();
        assert_eq!(payload.birth.year, 1980);
        assert_eq!(payload.birth.timezone.as_deref(), Some("Europe/London"));
        assert!(payload.zodiac_type.is_none());
    }

    #[test]
    fn chart_options_fall_back_to_defaults() {
        let request: BirthChartRequest = serde_json::from_str(
            r#"{"subject": {
                "name": "n", "year": 2000, "month": 1, "day": 1,
                "hour": 0, "minute": 0, "city": "Roma",
                "geonames_username": "demo"
            }}"#,
        )
        .unwrap();
        assert_eq!(request.options.theme(), "classic");
        assert_eq!(request.options.language(), "EN");
        assert!(!request.options.wheel_only);
        assert_eq!(request.options.active_points().len(), DEFAULT_ACTIVE_POINTS.len());
        assert_eq!(request.options.active_aspects()[0].name, "conjunction");
    }

    #[test]
    fn ephemeris_defaults_match_greenwich() {
        let request: EphemerisDataRequest = serde_json::from_str(
            r#"{"start_date": "2023-01-01T00:00:00", "end_date": "2023-01-31T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(request.step_type, "days");
        assert_eq!(request.step, 1);
        assert_eq!(request.timezone, "Etc/UTC");
        assert_eq!(request.max_days, Some(730));
        assert_eq!(request.format, "json");
    }

    #[test]
    fn explicit_null_caps_deserialize_to_none() {
        let request: EphemerisDataRequest = serde_json::from_str(
            r#"{
                "start_date": "2020-01-01T00:00:00", "end_date": "2023-01-01T00:00:00",
                "max_days": null, "max_hours": null, "max_minutes": null
            }"#,
        )
        .unwrap();
        assert_eq!(request.max_days, None);
        assert_eq!(request.max_hours, None);
        assert_eq!(request.max_minutes, None);
    }
}
