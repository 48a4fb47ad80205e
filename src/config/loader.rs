//! Configuration loading from disk.
//!
//! # Responsibilities
//! - Select the profile file (`dev.toml`, `test.toml`, `prod.toml`) from the
//!   `ASTRO_ENV` environment variable or an explicit override
//! - Apply environment-variable overrides for secrets
//! - Run semantic validation before the config is accepted
//!
//! # Design Decisions
//! - Validation returns all errors, not just the first
//! - Config is immutable once loaded; shared via `Arc` to all subsystems

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::Settings;

/// Environment variable naming the active profile.
pub const ENV_PROFILE: &str = "ASTRO_ENV";

/// Environment variable overriding the gate secret (single value).
pub const ENV_GATE_SECRET: &str = "GATE_SECRET_KEY";

/// Environment variable overriding the GeoNames username.
pub const ENV_GEONAMES_USERNAME: &str = "GEONAMES_USERNAME";

const KNOWN_PROFILES: &[&str] = &["dev", "test", "prod"];

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown profile '{0}' (expected one of dev, test, prod)")]
    UnknownProfile(String),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single semantic validation failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("engine.base_url '{0}' is not a valid URL")]
    EngineUrl(String),

    #[error("engine.timeout_secs must be greater than zero")]
    ZeroEngineTimeout,

    #[error("geonames.base_url '{0}' is not a valid URL")]
    GeonamesUrl(String),

    #[error("listener.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load the settings profile selected by `ASTRO_ENV` (default: dev).
pub fn load_from_env(config_dir: &Path) -> Result<Settings, ConfigError> {
    let profile = env::var(ENV_PROFILE).unwrap_or_else(|_| "dev".to_string());
    load_profile(config_dir, &profile)
}

/// Load and validate a named settings profile from `config_dir`.
pub fn load_profile(config_dir: &Path, profile: &str) -> Result<Settings, ConfigError> {
    if !KNOWN_PROFILES.contains(&profile) {
        return Err(ConfigError::UnknownProfile(profile.to_string()));
    }

    let path = config_dir.join(format!("{profile}.toml"));
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut settings: Settings = toml::from_str(&content)?;
    settings.general.environment = profile.to_string();
    apply_env_overrides(&mut settings);

    validate_settings(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}

/// Apply environment-variable overrides for secret material.
fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(secret) = env::var(ENV_GATE_SECRET) {
        if !secret.is_empty() {
            settings.gate.secret_keys = vec![secret];
        }
    }
    if let Ok(username) = env::var(ENV_GEONAMES_USERNAME) {
        if !username.is_empty() {
            settings.geonames.username = username;
        }
    }
}

/// Semantic validation. Serde already guarantees the shape; this checks the
/// values. Returns every violation found.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::BindAddress(
            settings.listener.bind_address.clone(),
        ));
    }

    if settings.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if settings.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if url::Url::parse(&settings.engine.base_url).is_err() {
        errors.push(ValidationError::EngineUrl(settings.engine.base_url.clone()));
    }

    if settings.engine.timeout_secs == 0 {
        errors.push(ValidationError::ZeroEngineTimeout);
    }

    if url::Url::parse(&settings.geonames.base_url).is_err() {
        errors.push(ValidationError::GeonamesUrl(
            settings.geonames.base_url.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Settings;

    #[test]
    fn default_settings_validate() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn all_violations_reported_together() {
        let mut settings = Settings::default();
        settings.listener.bind_address = "not-an-address".to_string();
        settings.timeouts.request_secs = 0;
        settings.engine.base_url = "::garbage::".to_string();

        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn unknown_profile_rejected() {
        let err = load_profile(Path::new("config"), "staging").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile(_)));
    }
}
