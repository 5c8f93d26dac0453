//! KMB adapter - Implements BusDataPort using integration_kmb

use std::fmt;
use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::BusDataPort;
use async_trait::async_trait;
use domain::{BusRoute, BusStop, EtaEntry};
use integration_kmb::{HttpKmbClient, KmbClient, KmbConfig, KmbError};
use tracing::{debug, instrument};

/// Adapter for the KMB open-data API
pub struct KmbBusDataAdapter {
    client: Arc<dyn KmbClient>,
}

impl fmt::Debug for KmbBusDataAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmbBusDataAdapter")
            .field("client", &"KmbClient")
            .finish()
    }
}

impl KmbBusDataAdapter {
    /// Create an adapter backed by [`HttpKmbClient`]
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: &KmbConfig) -> Result<Self, ApplicationError> {
        let client = HttpKmbClient::new(config).map_err(Self::map_error)?;
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Wrap an existing client
    #[must_use]
    pub fn with_client(client: Arc<dyn KmbClient>) -> Self {
        Self { client }
    }

    /// Map integration KMB error to application error
    fn map_error(err: KmbError) -> ApplicationError {
        match err {
            KmbError::ConfigurationError(msg) => ApplicationError::Configuration(msg),
            KmbError::RateLimitExceeded { .. } => ApplicationError::RateLimited,
            other => ApplicationError::ExternalService(format!("KMB: {other}")),
        }
    }
}

#[async_trait]
impl BusDataPort for KmbBusDataAdapter {
    #[instrument(skip(self))]
    async fn fetch_routes(&self) -> Result<Vec<BusRoute>, ApplicationError> {
        let routes = self.client.fetch_routes().await.map_err(Self::map_error)?;
        debug!(count = routes.len(), "Retrieved KMB routes");
        Ok(routes)
    }

    #[instrument(skip(self))]
    async fn fetch_stops(&self) -> Result<Vec<BusStop>, ApplicationError> {
        let stops = self.client.fetch_stops().await.map_err(Self::map_error)?;
        debug!(count = stops.len(), "Retrieved KMB stops");
        Ok(stops)
    }

    #[instrument(skip(self))]
    async fn fetch_stop_eta(&self, stop_id: &str) -> Result<Vec<EtaEntry>, ApplicationError> {
        self.client
            .fetch_stop_eta(stop_id)
            .await
            .map_err(Self::map_error)
    }
}
