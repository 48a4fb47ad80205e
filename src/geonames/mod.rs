//! Geocoding proxy.
//!
//! # Data Flow
//! ```text
//! POST /api/v1/city-data {city, country}
//!     → client.rs (searchJSON query, prefix match, populated places only)
//!     → cache.rs (24h TTL, keyed by normalized city/country)
//!     → CityMatch records back to the handler
//! ```

pub mod cache;
pub mod client;

use serde::{Deserialize, Serialize};

pub use cache::LookupCache;
pub use client::{GeonamesClient, GeonamesError};

/// A city search result as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityMatch {
    /// City name.
    pub name: String,
    /// Latitude, kept verbatim as reported upstream.
    pub lat: String,
    /// Longitude, kept verbatim as reported upstream.
    pub lng: String,
    /// Country name.
    pub country: String,
    /// Two-letter country code.
    pub country_code: String,
    /// First-level administrative division (region, state).
    pub admin_name: String,
    /// "City, Region, Country" display string.
    pub name_located: String,
}
