//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config/{dev,test,prod}.toml
//!     → loader.rs (select profile, parse, env overrides)
//!     → loader.rs::validate_settings (semantic checks)
//!     → Settings (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets come from the environment, never from the repo

pub mod loader;
pub mod schema;

pub use loader::{load_from_env, load_profile, ConfigError, ValidationError};
pub use schema::{
    EngineConfig, GateConfig, GeneralConfig, GeonamesConfig, ListenerConfig,
    ObservabilityConfig, Settings, TimeoutConfig,
};
