//! GeoNames search client.
//!
//! # Responsibilities
//! - Proxy city lookups to a GeoNames-compatible `searchJSON` API
//! - Reshape upstream records into the API's `CityMatch` form
//! - Serve repeat lookups from the TTL cache
//!
//! # Design Decisions
//! - Coordinates stay as strings; this layer never parses them
//! - Upstream failures surface as errors, never as an empty result set

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::GeonamesConfig;
use crate::geonames::cache::LookupCache;
use crate::geonames::CityMatch;

const MAX_ROWS: u32 = 10;

/// Errors surfaced by city lookups.
#[derive(Debug, Error)]
pub enum GeonamesError {
    /// No username configured and none supplied.
    #[error("no GeoNames username configured")]
    NoUsername,

    /// The configured base URL did not parse.
    #[error("invalid GeoNames base URL: {0}")]
    BadBaseUrl(#[from] url::ParseError),

    /// The HTTP call failed (connect, timeout, non-2xx).
    #[error("GeoNames request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// GeoNames answered with its own error payload.
    #[error("GeoNames error: {0}")]
    Upstream(String),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    geonames: Vec<RawGeoname>,
    #[serde(default)]
    status: Option<UpstreamStatus>,
}

#[derive(Debug, Deserialize)]
struct UpstreamStatus {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawGeoname {
    #[serde(default)]
    name: String,
    #[serde(default)]
    lat: String,
    #[serde(default)]
    lng: String,
    #[serde(default, rename = "countryName")]
    country_name: String,
    #[serde(default, rename = "countryCode")]
    country_code: String,
    #[serde(default, rename = "adminName1")]
    admin_name: String,
}

impl RawGeoname {
    fn into_match(self) -> CityMatch {
        let name_located = format!("{}, {}, {}", self.name, self.admin_name, self.country_name);
        CityMatch {
            name: self.name,
            lat: self.lat,
            lng: self.lng,
            country: self.country_name,
            country_code: self.country_code,
            admin_name: self.admin_name,
            name_located,
        }
    }
}

/// Client for proxied city lookups, with a shared TTL cache.
#[derive(Clone)]
pub struct GeonamesClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    cache: LookupCache,
}

impl GeonamesClient {
    /// Create a new client from configuration, reusing the shared HTTP
    /// client.
    pub fn new(http: reqwest::Client, config: &GeonamesConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            cache: LookupCache::new(Duration::from_secs(config.cache_ttl_secs)),
        }
    }

    /// Look up populated places matching a city-name prefix in a country.
    /// Results (including empty ones) are cached for the configured TTL.
    pub async fn lookup(&self, city: &str, country: &str) -> Result<Vec<CityMatch>, GeonamesError> {
        if self.username.is_empty() {
            return Err(GeonamesError::NoUsername);
        }

        if let Some(cached) = self.cache.get(city, country) {
            tracing::debug!(city, country, "City lookup served from cache");
            return Ok(cached);
        }

        let mut url = Url::parse(&format!("{}/searchJSON", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("name_startsWith", city)
            .append_pair("country", country)
            .append_pair("username", &self.username)
            .append_pair("maxRows", &MAX_ROWS.to_string())
            .append_pair("featureClass", "P");

        let response = self.http.get(url).send().await?.error_for_status()?;
        let body: SearchResponse = response.json().await?;

        if let Some(status) = body.status {
            tracing::warn!(city, country, message = %status.message, "GeoNames rejected lookup");
            return Err(GeonamesError::Upstream(status.message));
        }

        let matches: Vec<CityMatch> = body
            .geonames
            .into_iter()
            .map(RawGeoname::into_match)
            .collect();

        tracing::debug!(city, country, count = matches.len(), "City lookup resolved");
        self.cache.insert(city, country, matches.clone());
        Ok(matches)
    }
}

impl std::fmt::Debug for GeonamesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeonamesClient")
            .field("base_url", &self.base_url)
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_record_reshapes_into_match() {
        let raw: RawGeoname = serde_json::from_str(
            r#"{
                "name": "Rome",
                "lat": "41.89193",
                "lng": "12.51133",
                "countryName": "Italy",
                "countryCode": "IT",
                "adminName1": "Latium"
            }"#,
        )
        .unwrap();
        let m = raw.into_match();
        assert_eq!(m.lat, "41.89193");
        assert_eq!(m.name_located, "Rome, Latium, Italy");
    }

    #[test]
    fn upstream_error_payload_deserializes() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"status": {"message": "user account not enabled", "value": 10}}"#,
        )
        .unwrap();
        assert!(body.geonames.is_empty());
        assert_eq!(body.status.unwrap().message, "user account not enabled");
    }

    #[tokio::test]
    async fn missing_username_is_rejected_before_any_io() {
        let client = GeonamesClient::new(
            reqwest::Client::new(),
            &GeonamesConfig {
                base_url: "http://api.geonames.org".to_string(),
                username: String::new(),
                cache_ttl_secs: 60,
            },
        );
        let err = client.lookup("Roma", "IT").await.unwrap_err();
        assert!(matches!(err, GeonamesError::NoUsername));
    }
}
