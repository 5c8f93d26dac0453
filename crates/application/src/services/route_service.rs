//! Route listing with local fallback

use std::fmt;
use std::sync::Arc;

use domain::BusRoute;
use serde::Serialize;
use tracing::{instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{BusDataPort, FallbackDataPort};
use crate::services::stop_index_service::DataSource;

/// Routes with their origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteListing {
    /// Where the list came from
    pub source: DataSource,
    /// Number of routes
    pub count: usize,
    /// The routes
    pub routes: Vec<BusRoute>,
}

/// Lists bus routes, preferring live data
pub struct RouteService {
    bus_data: Arc<dyn BusDataPort>,
    fallback: Arc<dyn FallbackDataPort>,
}

impl fmt::Debug for RouteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteService").finish_non_exhaustive()
    }
}

impl RouteService {
    /// Create the service
    pub fn new(bus_data: Arc<dyn BusDataPort>, fallback: Arc<dyn FallbackDataPort>) -> Self {
        Self { bus_data, fallback }
    }

    /// All routes, or only those numbered `route`
    ///
    /// # Errors
    ///
    /// `Configuration` when the upstream URL is unusable, `ExternalService` when
    /// neither the upstream nor the local snapshot answers, `NotFound` when a
    /// route filter matches nothing.
    #[instrument(skip(self))]
    pub async fn list_routes(&self, route: Option<&str>) -> Result<RouteListing, ApplicationError> {
        let (routes, source) = match self.bus_data.fetch_routes().await {
            Ok(routes) => (routes, DataSource::Upstream),
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Route list fetch failed, using local snapshot");
                let routes = self.fallback.load_routes().await.map_err(|fe| {
                    ApplicationError::ExternalService(format!(
                        "route list unavailable ({e}); local snapshot failed ({fe})"
                    ))
                })?;
                (routes, DataSource::Fallback)
            },
        };

        let routes: Vec<BusRoute> = match route.map(str::trim).filter(|r| !r.is_empty()) {
            Some(wanted) => {
                let matching: Vec<BusRoute> =
                    routes.into_iter().filter(|r| r.is_route(wanted)).collect();
                if matching.is_empty() {
                    return Err(ApplicationError::NotFound(format!("route {wanted}")));
                }
                matching
            },
            None => routes,
        };

        Ok(RouteListing {
            source,
            count: routes.len(),
            routes,
        })
    }
}
