//! Geocoding port
//!
//! Resolves free-text addresses and place names to coordinates.

use async_trait::async_trait;
use domain::value_objects::GeoLocation;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for forward geocoding
///
/// An address that cannot be resolved is `Ok(None)`; errors are reserved for
/// the provider failing to answer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Resolve a free-text query to a coordinate
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>, ApplicationError>;
}
