//! Endpoint handlers, grouped by concern.

pub mod astrology;
pub mod geonames;
