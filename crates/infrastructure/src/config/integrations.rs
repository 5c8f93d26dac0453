//! Upstream service sections: KMB, HKO, geocoding and the local fallback files.

use std::path::PathBuf;

use application::{
    DEFAULT_ETA_FETCH_CONCURRENCY, DEFAULT_GEOCODE_REGION, DEFAULT_NEAR_STOP_RADIUS_DEGREES,
    DEFAULT_TOP_N, NearbyStopConfig,
};
use domain::Language;
use serde::{Deserialize, Serialize};

use super::HttpConfig;

/// KMB open-data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KmbAppConfig {
    /// Full route list URL
    #[serde(default = "default_route_list_url")]
    pub route_list_url: String,

    /// Full stop list URL
    #[serde(default = "default_stop_list_url")]
    pub stop_list_url: String,

    /// Per-stop arrival URL containing `{stop_id}`
    #[serde(default = "default_stop_eta_url_template")]
    pub stop_eta_url_template: String,

    /// Half-width of the nearby-stop search box, in degrees
    #[serde(default = "default_near_stop_radius")]
    pub near_stop_radius_degrees: f64,

    /// Maximum in-flight arrival requests per lookup
    #[serde(default = "default_eta_fetch_concurrency")]
    pub eta_fetch_concurrency: usize,

    /// Overrides `http.timeout_secs`
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_route_list_url() -> String {
    integration_kmb::KmbConfig::default().route_list_url
}

fn default_stop_list_url() -> String {
    integration_kmb::KmbConfig::default().stop_list_url
}

fn default_stop_eta_url_template() -> String {
    integration_kmb::KmbConfig::default().stop_eta_url_template
}

const fn default_near_stop_radius() -> f64 {
    DEFAULT_NEAR_STOP_RADIUS_DEGREES
}

const fn default_eta_fetch_concurrency() -> usize {
    DEFAULT_ETA_FETCH_CONCURRENCY
}

impl Default for KmbAppConfig {
    fn default() -> Self {
        Self {
            route_list_url: default_route_list_url(),
            stop_list_url: default_stop_list_url(),
            stop_eta_url_template: default_stop_eta_url_template(),
            near_stop_radius_degrees: default_near_stop_radius(),
            eta_fetch_concurrency: default_eta_fetch_concurrency(),
            timeout_secs: None,
        }
    }
}

impl KmbAppConfig {
    /// Convert to `integration_kmb::KmbConfig`
    #[must_use]
    pub fn to_kmb_config(&self, http: &HttpConfig) -> integration_kmb::KmbConfig {
        integration_kmb::KmbConfig {
            route_list_url: self.route_list_url.clone(),
            stop_list_url: self.stop_list_url.clone(),
            stop_eta_url_template: self.stop_eta_url_template.clone(),
            timeout_secs: self.timeout_secs.unwrap_or(http.timeout_secs),
            user_agent: http.user_agent.clone(),
        }
    }

    /// Search parameters for the nearby-stop workflow
    #[must_use]
    pub const fn to_nearby_stop_config(&self) -> NearbyStopConfig {
        NearbyStopConfig {
            radius_degrees: self.near_stop_radius_degrees,
            eta_fetch_concurrency: self.eta_fetch_concurrency,
        }
    }
}

/// Hong Kong Observatory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HkoAppConfig {
    /// Dataset URL containing `{data_type}` and `{lang}`
    #[serde(default = "default_weather_url_template")]
    pub weather_url_template: String,

    /// Language used when a request does not name one
    #[serde(default)]
    pub default_lang: Language,

    /// Stations returned by the nearby-station lookup when `top_n` is absent
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Region appended to station names before geocoding
    #[serde(default = "default_geocode_region")]
    pub geocode_region: String,

    /// Overrides `http.timeout_secs`
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_weather_url_template() -> String {
    integration_hko::HkoConfig::default().weather_url_template
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_geocode_region() -> String {
    DEFAULT_GEOCODE_REGION.to_string()
}

impl Default for HkoAppConfig {
    fn default() -> Self {
        Self {
            weather_url_template: default_weather_url_template(),
            default_lang: Language::default(),
            default_top_n: default_top_n(),
            geocode_region: default_geocode_region(),
            timeout_secs: None,
        }
    }
}

impl HkoAppConfig {
    /// Convert to `integration_hko::HkoConfig`
    #[must_use]
    pub fn to_hko_config(&self, http: &HttpConfig) -> integration_hko::HkoConfig {
        integration_hko::HkoConfig {
            weather_url_template: self.weather_url_template.clone(),
            timeout_secs: self.timeout_secs.unwrap_or(http.timeout_secs),
            user_agent: http.user_agent.clone(),
        }
    }
}

/// Nominatim geocoding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingAppConfig {
    /// Nominatim base URL
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,

    /// Minimum gap between requests in milliseconds
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// ISO country code filter (empty for worldwide)
    #[serde(default = "default_country_filter")]
    pub country_filter: String,

    /// Preferred result languages
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// User-Agent override; falls back to `http.user_agent`
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_geocoding_base_url() -> String {
    integration_geocoding::NominatimConfig::default().base_url
}

const fn default_geocoding_timeout() -> u64 {
    10
}

const fn default_min_request_interval_ms() -> u64 {
    1100
}

fn default_country_filter() -> String {
    "hk".to_string()
}

fn default_accept_language() -> String {
    "en,zh-HK".to_string()
}

impl Default for GeocodingAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            timeout_secs: default_geocoding_timeout(),
            min_request_interval_ms: default_min_request_interval_ms(),
            country_filter: default_country_filter(),
            accept_language: default_accept_language(),
            user_agent: None,
        }
    }
}

impl GeocodingAppConfig {
    /// Convert to `integration_geocoding::NominatimConfig`
    #[must_use]
    pub fn to_nominatim_config(&self, http: &HttpConfig) -> integration_geocoding::NominatimConfig {
        integration_geocoding::NominatimConfig {
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            min_request_interval_ms: self.min_request_interval_ms,
            country_filter: self.country_filter.clone(),
            accept_language: self.accept_language.clone(),
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| http.user_agent.clone()),
        }
    }
}

/// Local snapshot files used when the operator API is down
///
/// Files live in `{base_folder}/res/` and have the operator's list-payload shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Folder containing `res/`
    #[serde(default = "default_base_folder")]
    pub base_folder: PathBuf,

    /// Stop list file name
    #[serde(default = "default_stop_data_file")]
    pub stop_data_file: String,

    /// Route list file name
    #[serde(default = "default_route_data_file")]
    pub route_data_file: String,
}

fn default_base_folder() -> PathBuf {
    PathBuf::from(".")
}

fn default_stop_data_file() -> String {
    "kmb_stop_data.json".to_string()
}

fn default_route_data_file() -> String {
    "kmb_route_data.json".to_string()
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            base_folder: default_base_folder(),
            stop_data_file: default_stop_data_file(),
            route_data_file: default_route_data_file(),
        }
    }
}

impl FallbackConfig {
    /// Full path of the stop snapshot
    #[must_use]
    pub fn stop_data_path(&self) -> PathBuf {
        self.base_folder.join("res").join(&self.stop_data_file)
    }

    /// Full path of the route snapshot
    #[must_use]
    pub fn route_data_path(&self) -> PathBuf {
        self.base_folder.join("res").join(&self.route_data_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kmb_timeout_override_wins() {
        let http = HttpConfig::default();
        let kmb = KmbAppConfig {
            timeout_secs: Some(7),
            ..Default::default()
        };
        assert_eq!(kmb.to_kmb_config(&http).timeout_secs, 7);
        assert_eq!(KmbAppConfig::default().to_kmb_config(&http).timeout_secs, 60);
    }

    #[test]
    fn kmb_search_parameters() {
        let config = KmbAppConfig::default().to_nearby_stop_config();
        assert!((config.radius_degrees - 0.003).abs() < f64::EPSILON);
        assert_eq!(config.eta_fetch_concurrency, 8);
    }

    #[test]
    fn hko_defaults() {
        let config = HkoAppConfig::default();
        assert_eq!(config.default_lang, Language::TraditionalChinese);
        assert_eq!(config.default_top_n, 1);
        assert_eq!(config.geocode_region, "Hong Kong");
        assert!(config.weather_url_template.contains("{data_type}"));
    }

    #[test]
    fn geocoding_user_agent_falls_back_to_http() {
        let http = HttpConfig {
            timeout_secs: 60,
            user_agent: "custom/1.0".to_string(),
        };
        let nominatim = GeocodingAppConfig::default().to_nominatim_config(&http);
        assert_eq!(nominatim.user_agent, "custom/1.0");
        assert_eq!(nominatim.min_request_interval_ms, 1100);
        assert_eq!(nominatim.country_filter, "hk");
    }

    #[test]
    fn fallback_paths_live_under_res() {
        let config = FallbackConfig {
            base_folder: PathBuf::from("/srv/hkbus"),
            ..Default::default()
        };
        assert_eq!(
            config.stop_data_path(),
            PathBuf::from("/srv/hkbus/res/kmb_stop_data.json")
        );
        assert_eq!(
            config.route_data_path(),
            PathBuf::from("/srv/hkbus/res/kmb_route_data.json")
        );
    }
}
