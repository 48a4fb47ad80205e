//! Lookup result caching for the geocoding proxy.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::geonames::CityMatch;

/// A cached lookup result with its insertion time.
#[derive(Debug, Clone)]
struct CachedLookup {
    matches: Vec<CityMatch>,
    stored_at: Instant,
}

/// A thread-safe TTL cache for city lookups, keyed by normalized
/// (city, country) pairs. Entries expire lazily on read.
#[derive(Clone)]
pub struct LookupCache {
    inner: Arc<DashMap<(String, String), CachedLookup>>,
    ttl: Duration,
}

impl LookupCache {
    /// Create a new empty cache with the given entry time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
        }
    }

    fn key(city: &str, country: &str) -> (String, String) {
        (city.to_lowercase(), country.to_uppercase())
    }

    /// Get a cached result if present and still fresh. Expired entries are
    /// removed on the way out.
    pub fn get(&self, city: &str, country: &str) -> Option<Vec<CityMatch>> {
        let key = Self::key(city, country);
        if let Some(entry) = self.inner.get(&key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.matches.clone());
            }
        }
        self.inner.remove(&key);
        None
    }

    /// Store a lookup result.
    pub fn insert(&self, city: &str, country: &str, matches: Vec<CityMatch>) {
        self.inner.insert(
            Self::key(city, country),
            CachedLookup {
                matches,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of entries currently held, fresh or not.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
