//! HKO adapter - Implements WeatherPort using integration_hko

use std::fmt;
use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::WeatherPort;
use async_trait::async_trait;
use domain::{CurrentWeatherReport, Language, LocalForecast, WeatherDataType};
use integration_hko::{HkoClient, HkoConfig, HkoError, HttpHkoClient};
use tracing::{debug, instrument};

/// Adapter for the Hong Kong Observatory open-data API
pub struct HkoWeatherAdapter {
    client: Arc<dyn HkoClient>,
}

impl fmt::Debug for HkoWeatherAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HkoWeatherAdapter")
            .field("client", &"HkoClient")
            .finish()
    }
}

impl HkoWeatherAdapter {
    /// Create an adapter backed by [`HttpHkoClient`]
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: HkoConfig) -> Result<Self, ApplicationError> {
        let client = HttpHkoClient::new(config).map_err(Self::map_error)?;
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Wrap an existing client
    #[must_use]
    pub fn with_client(client: Arc<dyn HkoClient>) -> Self {
        Self { client }
    }

    fn map_error(err: HkoError) -> ApplicationError {
        match err {
            HkoError::ConfigurationError(msg) => ApplicationError::Configuration(msg),
            HkoError::RateLimitExceeded => ApplicationError::RateLimited,
            other => ApplicationError::ExternalService(format!("HKO: {other}")),
        }
    }
}

#[async_trait]
impl WeatherPort for HkoWeatherAdapter {
    #[instrument(skip(self))]
    async fn fetch_current_report(
        &self,
        lang: Language,
    ) -> Result<CurrentWeatherReport, ApplicationError> {
        let report = self
            .client
            .fetch_current_report(lang)
            .await
            .map_err(Self::map_error)?;
        debug!(stations = report.temperatures.len(), "Retrieved current weather report");
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn fetch_local_forecast(&self, lang: Language) -> Result<LocalForecast, ApplicationError> {
        self.client
            .fetch_local_forecast(lang)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn fetch_raw(
        &self,
        data_type: WeatherDataType,
        lang: Language,
    ) -> Result<serde_json::Value, ApplicationError> {
        self.client
            .fetch_raw(data_type, lang)
            .await
            .map_err(Self::map_error)
    }
}
