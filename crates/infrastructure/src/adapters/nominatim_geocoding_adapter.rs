//! Geocoding adapter - Implements GeocodingPort using integration_geocoding

use std::fmt;
use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::GeocodingPort;
use async_trait::async_trait;
use domain::GeoLocation;
use integration_geocoding::{
    GeocodingClient, GeocodingError, NominatimConfig, NominatimGeocodingClient,
};
use tracing::{debug, instrument};

/// Adapter for Nominatim forward geocoding
pub struct NominatimGeocodingAdapter {
    client: Arc<dyn GeocodingClient>,
}

impl fmt::Debug for NominatimGeocodingAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NominatimGeocodingAdapter")
            .field("client", &"GeocodingClient")
            .finish()
    }
}

impl NominatimGeocodingAdapter {
    /// Create an adapter backed by [`NominatimGeocodingClient`]
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: &NominatimConfig) -> Result<Self, ApplicationError> {
        let client = NominatimGeocodingClient::new(config)
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Wrap an existing client
    #[must_use]
    pub fn with_client(client: Arc<dyn GeocodingClient>) -> Self {
        Self { client }
    }

    /// Map a lookup result; an unknown address is a regular `None`
    fn map_result(
        result: Result<GeoLocation, GeocodingError>,
    ) -> Result<Option<GeoLocation>, ApplicationError> {
        match result {
            Ok(location) => Ok(Some(location)),
            Err(GeocodingError::AddressNotFound(_)) => Ok(None),
            Err(GeocodingError::RateLimitExceeded) => Err(ApplicationError::RateLimited),
            Err(e) => Err(ApplicationError::ExternalService(e.to_string())),
        }
    }
}

#[async_trait]
impl GeocodingPort for NominatimGeocodingAdapter {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>, ApplicationError> {
        let result = Self::map_result(self.client.geocode(query).await);
        if let Ok(None) = result {
            debug!(%query, "Address not found");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_address() {
        let location = GeoLocation::tsim_sha_tsui();
        assert_eq!(
            NominatimGeocodingAdapter::map_result(Ok(location)).unwrap(),
            Some(location)
        );
    }

    #[test]
    fn unknown_address_is_none() {
        let result = NominatimGeocodingAdapter::map_result(Err(GeocodingError::AddressNotFound(
            "Atlantis".into(),
        )));
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn provider_failure_is_external() {
        let result = NominatimGeocodingAdapter::map_result(Err(GeocodingError::Timeout));
        assert!(matches!(result, Err(ApplicationError::ExternalService(_))));
    }

    #[test]
    fn new_creates_adapter() {
        assert!(NominatimGeocodingAdapter::new(&NominatimConfig::default()).is_ok());
    }
}
