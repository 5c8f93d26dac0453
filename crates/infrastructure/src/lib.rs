//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports over the KMB, HKO and Nominatim
//! integration crates and the local snapshot files, and owns configuration
//! loading and logging setup.

pub mod adapters;
pub mod config;
pub mod telemetry;
pub mod validation;

pub use adapters::*;
pub use config::{
    AppConfig, FallbackConfig, GeocodingAppConfig, HkoAppConfig, HttpConfig, KmbAppConfig,
    ServerConfig,
};
pub use telemetry::{DEFAULT_LOG_FILTER, LogFormat, TelemetryError, init_logging};
pub use validation::{ConfigValidator, ConfigWarning, WarningSeverity};
