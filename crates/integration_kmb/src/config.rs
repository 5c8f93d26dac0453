//! KMB client configuration

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the stop id in [`KmbConfig::stop_eta_url_template`]
pub const STOP_ID_PLACEHOLDER: &str = "{stop_id}";

/// Configuration for the KMB open-data endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KmbConfig {
    /// URL of the full route list
    #[serde(default = "default_route_list_url")]
    pub route_list_url: String,

    /// URL of the full stop list
    #[serde(default = "default_stop_list_url")]
    pub stop_list_url: String,

    /// Per-stop arrival URL, containing `{stop_id}`
    #[serde(default = "default_stop_eta_url_template")]
    pub stop_eta_url_template: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_route_list_url() -> String {
    "https://data.etabus.gov.hk/v1/transport/kmb/route/".to_string()
}

fn default_stop_list_url() -> String {
    "https://data.etabus.gov.hk/v1/transport/kmb/stop".to_string()
}

fn default_stop_eta_url_template() -> String {
    "https://data.etabus.gov.hk/v1/transport/kmb/stop-eta/{stop_id}".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    concat!("hkbus-server/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for KmbConfig {
    fn default() -> Self {
        Self {
            route_list_url: default_route_list_url(),
            stop_list_url: default_stop_list_url(),
            stop_eta_url_template: default_stop_eta_url_template(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl KmbConfig {
    /// Create a configuration pointing every endpoint at `base_url` (mock servers)
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            route_list_url: format!("{base}/v1/transport/kmb/route/"),
            stop_list_url: format!("{base}/v1/transport/kmb/stop"),
            stop_eta_url_template: format!("{base}/v1/transport/kmb/stop-eta/{STOP_ID_PLACEHOLDER}"),
            timeout_secs: 5,
            ..Default::default()
        }
    }
}
