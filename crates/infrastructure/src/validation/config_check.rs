//! Configuration sanity checks
//!
//! Reports blank or malformed endpoints and out-of-range tuning values.
//! Nothing here stops startup; operations depending on a bad value fail with
//! a configuration error when they run.

use std::fmt;

use crate::config::AppConfig;

/// Severity of a configuration warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningSeverity {
    /// Worth knowing, nothing breaks
    Info,
    /// Some operations will fail
    Warning,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

/// A single configuration finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Severity level
    pub severity: WarningSeverity,
    /// Dotted configuration key
    pub key: String,
    /// What is wrong
    pub message: String,
}

impl ConfigWarning {
    fn warning(key: &str, message: impl Into<String>) -> Self {
        Self {
            severity: WarningSeverity::Warning,
            key: key.to_string(),
            message: message.into(),
        }
    }

    fn info(key: &str, message: impl Into<String>) -> Self {
        Self {
            severity: WarningSeverity::Info,
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.key, self.message)
    }
}

/// Validates an [`AppConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// All findings, warnings first
    #[must_use]
    pub fn validate(config: &AppConfig) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        check_url(&mut warnings, "kmb.route_list_url", &config.kmb.route_list_url, &[]);
        check_url(&mut warnings, "kmb.stop_list_url", &config.kmb.stop_list_url, &[]);
        check_url(
            &mut warnings,
            "kmb.stop_eta_url_template",
            &config.kmb.stop_eta_url_template,
            &["{stop_id}"],
        );
        check_url(
            &mut warnings,
            "hko.weather_url_template",
            &config.hko.weather_url_template,
            &["{data_type}", "{lang}"],
        );
        check_url(&mut warnings, "geocoding.base_url", &config.geocoding.base_url, &[]);

        let radius = config.kmb.near_stop_radius_degrees;
        if !radius.is_finite() || radius <= 0.0 {
            warnings.push(ConfigWarning::warning(
                "kmb.near_stop_radius_degrees",
                format!("must be a positive number of degrees, got {radius}"),
            ));
        }
        if config.kmb.eta_fetch_concurrency == 0 {
            warnings.push(ConfigWarning::info(
                "kmb.eta_fetch_concurrency",
                "0 is treated as 1",
            ));
        }
        if config.hko.default_top_n == 0 {
            warnings.push(ConfigWarning::info(
                "hko.default_top_n",
                "station lookups without top_n will return no stations",
            ));
        }
        if config.geocoding.min_request_interval_ms < 1000
            && config.geocoding.base_url.contains("nominatim.openstreetmap.org")
        {
            warnings.push(ConfigWarning::info(
                "geocoding.min_request_interval_ms",
                "the public Nominatim service allows one request per second",
            ));
        }
        if !matches!(config.server.log_format.as_str(), "json" | "text") {
            warnings.push(ConfigWarning::info(
                "server.log_format",
                format!("unknown format {:?}, using text", config.server.log_format),
            ));
        }

        warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
        warnings
    }
}

fn check_url(warnings: &mut Vec<ConfigWarning>, key: &str, value: &str, placeholders: &[&str]) {
    let value = value.trim();
    if value.is_empty() {
        warnings.push(ConfigWarning::warning(key, "is not configured"));
        return;
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        warnings.push(ConfigWarning::warning(
            key,
            format!("{value:?} is not an http(s) URL"),
        ));
    }
    for placeholder in placeholders {
        if !value.contains(placeholder) {
            warnings.push(ConfigWarning::warning(
                key,
                format!("must contain {placeholder}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_url_is_reported() {
        let mut config = AppConfig::default();
        config.kmb.stop_list_url = "  ".to_string();

        let warnings = ConfigValidator::validate(&config);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, "kmb.stop_list_url");
        assert_eq!(warnings[0].severity, WarningSeverity::Warning);
    }

    #[test]
    fn template_without_placeholder_is_reported() {
        let mut config = AppConfig::default();
        config.hko.weather_url_template =
            "https://data.weather.gov.hk/weatherAPI/opendata/weather.php?dataType=rhrread"
                .to_string();

        let messages: Vec<String> = ConfigValidator::validate(&config)
            .into_iter()
            .map(|w| w.message)
            .collect();
        assert_eq!(messages, vec!["must contain {data_type}", "must contain {lang}"]);
    }

    #[test]
    fn non_positive_radius_is_reported() {
        let mut config = AppConfig::default();
        config.kmb.near_stop_radius_degrees = 0.0;
        assert!(
            ConfigValidator::validate(&config)
                .iter()
                .any(|w| w.key == "kmb.near_stop_radius_degrees")
        );
    }

    #[test]
    fn warnings_sort_before_info() {
        let mut config = AppConfig::default();
        config.hko.default_top_n = 0;
        config.kmb.route_list_url = String::new();

        let warnings = ConfigValidator::validate(&config);
        assert_eq!(warnings[0].severity, WarningSeverity::Warning);
        assert_eq!(warnings[1].severity, WarningSeverity::Info);
    }

    #[test]
    fn display_format() {
        let warning = ConfigWarning::warning("kmb.stop_list_url", "is not configured");
        assert_eq!(
            warning.to_string(),
            "[WARNING] kmb.stop_list_url: is not configured"
        );
    }
}
