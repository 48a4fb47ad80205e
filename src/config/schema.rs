//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the astrology gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// General service settings (environment, debug flag, time source).
    pub general: GeneralConfig,

    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Secret-header gate settings.
    pub gate: GateConfig,

    /// Astrology engine collaborator settings.
    pub engine: EngineConfig,

    /// Geocoding (GeoNames) proxy settings.
    pub geonames: GeonamesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// General service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Environment name (dev, test, prod). Set by the loader from the
    /// selected profile; a value in the file is overwritten.
    pub environment: String,

    /// Debug flag, reported by the status endpoint.
    pub debug: bool,

    /// URL probed with a HEAD request to read the current UTC time from its
    /// `Date` header. Some hosts have an unreliable system clock.
    pub time_source_url: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            debug: true,
            time_source_url: "https://www.google.com".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Secret-header gate configuration.
///
/// When either field is empty the gate is disabled and every request passes
/// through. That degraded mode is intentional but logged at ERROR level at
/// startup.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Name of the header carrying the shared secret.
    pub header_name: String,

    /// Allow-list of accepted secret values. Overridable via the
    /// `GATE_SECRET_KEY` environment variable (single value).
    pub secret_keys: Vec<String>,
}

impl GateConfig {
    /// True when both a header name and at least one secret are set.
    pub fn is_configured(&self) -> bool {
        !self.header_name.is_empty() && !self.secret_keys.is_empty()
    }
}

/// Astrology engine collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the engine sidecar (e.g., "http://127.0.0.1:9000").
    pub base_url: String,

    /// Per-call timeout in seconds. One attempt only, no retries.
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000".to_string(),
            timeout_secs: 20,
        }
    }
}

/// Geocoding proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeonamesConfig {
    /// Base URL of the GeoNames-compatible search API.
    pub base_url: String,

    /// Username used for proxied city lookups. Overridable via the
    /// `GEONAMES_USERNAME` environment variable.
    pub username: String,

    /// Cache time-to-live for lookup responses in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for GeonamesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://api.geonames.org".to_string(),
            username: String::new(),
            cache_ttl_secs: 86_400,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(settings.timeouts.request_secs, 30);
        assert_eq!(settings.geonames.cache_ttl_secs, 86_400);
        assert!(!settings.gate.is_configured());
    }

    #[test]
    fn gate_configured_requires_both_fields() {
        let gate = GateConfig {
            header_name: "X-Proxy-Secret".to_string(),
            secret_keys: vec![],
        };
        assert!(!gate.is_configured());

        let gate = GateConfig {
            header_name: "X-Proxy-Secret".to_string(),
            secret_keys: vec!["s3cret".to_string()],
        };
        assert!(gate.is_configured());
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [gate]
            header_name = "X-Proxy-Secret"
            secret_keys = ["abc"]
            "#,
        )
        .unwrap();
        assert!(settings.gate.is_configured());
        assert_eq!(settings.engine.timeout_secs, 20);
        assert_eq!(settings.general.environment, "dev");
    }
}
