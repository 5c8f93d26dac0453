//! Bus operator data port
//!
//! Live route, stop and arrival data from the bus operator.

use async_trait::async_trait;
use domain::{BusRoute, BusStop, EtaEntry};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the upstream bus operator API
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BusDataPort: Send + Sync {
    /// All routes
    async fn fetch_routes(&self) -> Result<Vec<BusRoute>, ApplicationError>;

    /// All stops
    async fn fetch_stops(&self) -> Result<Vec<BusStop>, ApplicationError>;

    /// Arrival estimates at one stop, for every route calling there
    async fn fetch_stop_eta(&self, stop_id: &str) -> Result<Vec<EtaEntry>, ApplicationError>;
}
