//! Weather service port
//!
//! Defines the interface for observatory weather data retrieval.

use async_trait::async_trait;
use domain::{CurrentWeatherReport, Language, LocalForecast, WeatherDataType};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for weather data
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherPort: Send + Sync {
    /// Current readings, one per weather station
    async fn fetch_current_report(
        &self,
        lang: Language,
    ) -> Result<CurrentWeatherReport, ApplicationError>;

    /// Local weather forecast
    async fn fetch_local_forecast(&self, lang: Language)
    -> Result<LocalForecast, ApplicationError>;

    /// Any dataset as untyped JSON
    async fn fetch_raw(
        &self,
        data_type: WeatherDataType,
        lang: Language,
    ) -> Result<serde_json::Value, ApplicationError>;
}
