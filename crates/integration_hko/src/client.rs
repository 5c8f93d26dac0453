//! HKO open-data client
//!
//! HTTP client for the Hong Kong Observatory weather API.

use std::time::Duration;

use async_trait::async_trait;
use domain::{CurrentWeatherReport, Language, LocalForecast, WeatherDataType};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::models::{RawLocalForecast, RawRegionalReport};

const DATA_TYPE_PLACEHOLDER: &str = "{data_type}";
const LANG_PLACEHOLDER: &str = "{lang}";

/// HKO client errors
#[derive(Debug, Error)]
pub enum HkoError {
    /// Connection to the HKO service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The service answered with a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse response from the HKO service
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The URL template is missing or malformed
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Request timeout
    #[error("Request timed out")]
    Timeout,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl HkoError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Timeout | Self::RateLimitExceeded
        )
    }

    /// Returns true if the error points at a deployment defect rather than the upstream
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }
}

/// HKO service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HkoConfig {
    /// Dataset URL containing `{data_type}` and `{lang}`
    #[serde(default = "default_weather_url_template")]
    pub weather_url_template: String,

    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_weather_url_template() -> String {
    "https://data.weather.gov.hk/weatherAPI/opendata/weather.php?dataType={data_type}&lang={lang}"
        .to_string()
}

const fn default_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    concat!("hkbus-server/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HkoConfig {
    fn default() -> Self {
        Self {
            weather_url_template: default_weather_url_template(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// HKO client trait for fetching weather datasets
#[async_trait]
pub trait HkoClient: Send + Sync {
    /// Current weather report (`rhrread`) with per-station temperatures
    async fn fetch_current_report(
        &self,
        lang: Language,
    ) -> Result<CurrentWeatherReport, HkoError>;

    /// Local weather forecast (`flw`)
    async fn fetch_local_forecast(&self, lang: Language) -> Result<LocalForecast, HkoError>;

    /// Any dataset as untyped JSON
    async fn fetch_raw(
        &self,
        data_type: WeatherDataType,
        lang: Language,
    ) -> Result<serde_json::Value, HkoError>;
}

/// reqwest-based HKO client
#[derive(Debug)]
pub struct HttpHkoClient {
    client: Client,
    config: HkoConfig,
}

impl HttpHkoClient {
    /// Create a new HKO client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: HkoConfig) -> Result<Self, HkoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HkoError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, HkoError> {
        Self::new(HkoConfig::default())
    }

    /// Fill the URL template for one dataset
    fn dataset_url(&self, data_type: WeatherDataType, lang: Language) -> Result<Url, HkoError> {
        let template = self.config.weather_url_template.trim();
        if template.is_empty() {
            return Err(HkoError::ConfigurationError(
                "hko.weather_url_template is not configured".to_string(),
            ));
        }
        if !template.contains(DATA_TYPE_PLACEHOLDER) || !template.contains(LANG_PLACEHOLDER) {
            return Err(HkoError::ConfigurationError(format!(
                "hko.weather_url_template must contain {DATA_TYPE_PLACEHOLDER} and {LANG_PLACEHOLDER}"
            )));
        }

        let filled = template
            .replace(DATA_TYPE_PLACEHOLDER, data_type.code())
            .replace(LANG_PLACEHOLDER, lang.code());
        Url::parse(&filled).map_err(|e| {
            HkoError::ConfigurationError(format!("hko.weather_url_template is not a valid URL: {e}"))
        })
    }

    /// Fetch a dataset and decode it as `T`
    async fn get_json<T: DeserializeOwned>(
        &self,
        data_type: WeatherDataType,
        lang: Language,
    ) -> Result<T, HkoError> {
        let url = self.dataset_url(data_type, lang)?;
        debug!(%url, "Requesting HKO dataset");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                HkoError::Timeout
            } else {
                HkoError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(HkoError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(HkoError::RequestFailed(format!("HTTP {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| HkoError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl HkoClient for HttpHkoClient {
    #[instrument(skip(self))]
    async fn fetch_current_report(
        &self,
        lang: Language,
    ) -> Result<CurrentWeatherReport, HkoError> {
        let raw: RawRegionalReport = self
            .get_json(WeatherDataType::CurrentReport, lang)
            .await?;
        let report = CurrentWeatherReport::from(raw);
        debug!(stations = report.temperatures.len(), "Fetched current weather report");
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn fetch_local_forecast(&self, lang: Language) -> Result<LocalForecast, HkoError> {
        let raw: RawLocalForecast = self.get_json(WeatherDataType::LocalForecast, lang).await?;
        Ok(LocalForecast::from(raw))
    }

    #[instrument(skip(self))]
    async fn fetch_raw(
        &self,
        data_type: WeatherDataType,
        lang: Language,
    ) -> Result<serde_json::Value, HkoError> {
        self.get_json(data_type, lang).await
    }
}
