//! Bundled reference data port

use async_trait::async_trait;
use domain::{BusRoute, BusStop};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for locally stored snapshots of the stop and route lists
///
/// Used when the upstream API cannot be reached.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FallbackDataPort: Send + Sync {
    /// Stops from the local snapshot
    async fn load_stops(&self) -> Result<Vec<BusStop>, ApplicationError>;

    /// Routes from the local snapshot
    async fn load_routes(&self) -> Result<Vec<BusRoute>, ApplicationError>;
}
