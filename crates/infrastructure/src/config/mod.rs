//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP listener and shared outbound-HTTP settings
//! - `integrations`: KMB, HKO, geocoding and fallback files
//!
//! Sources are layered: built-in defaults, then an optional TOML file
//! (`config.toml`, or the path in `HKBUS_CONFIG`), then `HKBUS_*`
//! environment variables with `__` between nested keys.

mod integrations;
mod server;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ConfigWarning};

pub use integrations::{FallbackConfig, GeocodingAppConfig, HkoAppConfig, KmbAppConfig};
pub use server::{HttpConfig, ServerConfig};

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "HKBUS_CONFIG";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "HKBUS";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound HTTP defaults
    #[serde(default)]
    pub http: HttpConfig,

    /// KMB bus data
    #[serde(default)]
    pub kmb: KmbAppConfig,

    /// Hong Kong Observatory weather data
    #[serde(default)]
    pub hko: HkoAppConfig,

    /// Address geocoding
    #[serde(default)]
    pub geocoding: GeocodingAppConfig,

    /// Local snapshot files
    #[serde(default)]
    pub fallback: FallbackConfig,
}

impl AppConfig {
    /// Load configuration from the optional file and the process environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load_with(path.as_deref().map(Path::new), Self::environment())
    }

    /// Load configuration from an explicit file, still honouring the environment
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::load_with(Some(path), Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        config::Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Problems worth reporting at startup
    ///
    /// Blank endpoints do not stop the server; the operations that need them
    /// fail with a configuration error instead.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigWarning> {
        ConfigValidator::validate(self)
    }
}
