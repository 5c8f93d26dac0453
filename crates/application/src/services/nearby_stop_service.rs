//! Nearby stop workflow
//!
//! Resolve a location, find the stops inside the search box around it, then
//! fetch arrival estimates for every stop. A failed estimate lookup only marks
//! its own stop; the rest of the answer is still returned.

use std::fmt;
use std::sync::Arc;

use domain::{BusStop, EtaEntry, GeoLocation};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{BusDataPort, GeocodingPort};
use crate::services::stop_index_service::{DEFAULT_NEAR_STOP_RADIUS_DEGREES, StopIndexService};

/// Default number of stop arrival requests in flight at once
pub const DEFAULT_ETA_FETCH_CONCURRENCY: usize = 8;

const ADDRESS_NOT_FOUND: &str = "Address not found";
const ADDRESS_NOT_FOUND_DETAILS: &str =
    "Could not geocode the provided address. Please check the address and try again.";
const NO_STOPS_MESSAGE: &str =
    "No bus stops found nearby. Try a different address or increase search radius.";

/// Tuning for the nearby stop search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyStopConfig {
    /// Search box half-width in decimal degrees
    pub radius_degrees: f64,
    /// Upper bound on concurrent arrival requests
    pub eta_fetch_concurrency: usize,
}

impl Default for NearbyStopConfig {
    fn default() -> Self {
        Self {
            radius_degrees: DEFAULT_NEAR_STOP_RADIUS_DEGREES,
            eta_fetch_concurrency: DEFAULT_ETA_FETCH_CONCURRENCY,
        }
    }
}

/// Where to search from
#[derive(Debug, Clone, PartialEq)]
pub enum StopQuery {
    /// Free-text address, geocoded first
    Address(String),
    /// Explicit coordinates
    Coordinates(GeoLocation),
}

impl StopQuery {
    fn address(&self) -> Option<&str> {
        match self {
            Self::Address(address) => Some(address),
            Self::Coordinates(_) => None,
        }
    }
}

/// Outcome of one stop's arrival lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EtaLookup {
    /// Estimates received (possibly none)
    Available(Vec<EtaEntry>),
    /// The lookup failed
    Failed {
        /// Why
        reason: String,
    },
}

/// A stop with its arrival estimates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopWithEta {
    /// The stop
    #[serde(flatten)]
    pub stop: BusStop,
    /// Estimates, after the route filter
    pub eta_data: Vec<EtaEntry>,
    /// Set when the lookup failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StopWithEta {
    /// Combine a stop with its lookup, keeping only entries for `route` if given
    pub fn new(stop: BusStop, lookup: EtaLookup, route: Option<&str>) -> Self {
        match lookup {
            EtaLookup::Available(entries) => Self {
                stop,
                eta_data: entries
                    .into_iter()
                    .filter(|entry| route.is_none_or(|r| entry.serves_route(r)))
                    .collect(),
                error: None,
            },
            EtaLookup::Failed { reason } => Self {
                stop,
                eta_data: Vec::new(),
                error: Some(format!("Failed to fetch ETA: {reason}")),
            },
        }
    }

    /// Whether the lookup for this stop failed
    pub const fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of the nearby stop workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NearbyStopsOutcome {
    /// At least one stop inside the search box
    Found {
        /// The address searched, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<String>,
        /// Resolved latitude
        latitude: f64,
        /// Resolved longitude
        longitude: f64,
        /// Number of stops found
        nearby_stops_count: usize,
        /// Per-stop records in proximity order
        stops_with_eta: Vec<StopWithEta>,
        /// Box half-width used
        search_radius_degrees: f64,
        /// Route filter applied, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        route_filter: Option<String>,
    },
    /// Location resolved but no stop inside the box
    NoStopsNearby {
        /// The address searched, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<String>,
        /// Resolved latitude
        latitude: f64,
        /// Resolved longitude
        longitude: f64,
        /// Always zero
        nearby_stops_count: usize,
        /// Always empty
        stops_with_eta: Vec<StopWithEta>,
        /// Human-readable hint
        message: String,
    },
    /// The geocoder has no match for the address
    AddressNotFound {
        /// Error summary
        error: String,
        /// The address searched
        address: String,
        /// Human-readable hint
        details: String,
    },
    /// The geocoder could not be reached
    GeocodingFailed {
        /// Error summary
        error: String,
        /// The address searched
        address: String,
        /// Underlying failure
        details: String,
    },
}

/// Result of a stop search without arrival estimates
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NearbyStopsListing {
    /// Location resolved; `nearby_stops` may be empty
    Located {
        /// The address searched, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<String>,
        /// Resolved latitude
        latitude: f64,
        /// Resolved longitude
        longitude: f64,
        /// Stops in proximity order
        nearby_stops: Vec<BusStop>,
        /// Box half-width used
        search_radius_degrees: f64,
    },
    /// Same as [`NearbyStopsOutcome::AddressNotFound`]
    AddressNotFound {
        error: String,
        address: String,
        details: String,
    },
    /// Same as [`NearbyStopsOutcome::GeocodingFailed`]
    GeocodingFailed {
        error: String,
        address: String,
        details: String,
    },
}

enum Resolved {
    At(GeoLocation),
    NotFound { address: String },
    Failed { address: String, details: String },
}

/// Orchestrates geocoding, the stop index and arrival lookups
pub struct NearbyStopService {
    geocoder: Arc<dyn GeocodingPort>,
    bus_data: Arc<dyn BusDataPort>,
    index: Arc<StopIndexService>,
    config: NearbyStopConfig,
}

impl fmt::Debug for NearbyStopService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NearbyStopService")
            .field("index", &self.index)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NearbyStopService {
    /// Create the workflow
    pub fn new(
        geocoder: Arc<dyn GeocodingPort>,
        bus_data: Arc<dyn BusDataPort>,
        index: Arc<StopIndexService>,
        config: NearbyStopConfig,
    ) -> Self {
        Self {
            geocoder,
            bus_data,
            index,
            config,
        }
    }

    /// Search parameters in use
    pub const fn config(&self) -> &NearbyStopConfig {
        &self.config
    }

    /// Stops near a location, each with its arrival estimates
    ///
    /// `route` narrows every stop's estimates to that route number; stops left
    /// with no estimates stay in the result.
    ///
    /// # Errors
    ///
    /// Only configuration errors are returned. Everything else is folded into
    /// the outcome.
    #[instrument(skip(self))]
    pub async fn find_stops_with_eta(
        &self,
        query: StopQuery,
        route: Option<&str>,
    ) -> Result<NearbyStopsOutcome, ApplicationError> {
        let route = route.map(str::trim).filter(|r| !r.is_empty());
        let address = query.address().map(ToString::to_string);

        let location = match self.resolve(&query).await? {
            Resolved::At(location) => location,
            Resolved::NotFound { address } => {
                return Ok(NearbyStopsOutcome::AddressNotFound {
                    error: ADDRESS_NOT_FOUND.to_string(),
                    address,
                    details: ADDRESS_NOT_FOUND_DETAILS.to_string(),
                });
            },
            Resolved::Failed { address, details } => {
                return Ok(NearbyStopsOutcome::GeocodingFailed {
                    error: "Geocoding failed".to_string(),
                    address,
                    details,
                });
            },
        };

        let stops = self
            .index
            .nearby(&location, self.config.radius_degrees)
            .await?;

        if stops.is_empty() {
            warn!(%location, "No nearby stops");
            return Ok(NearbyStopsOutcome::NoStopsNearby {
                address,
                latitude: location.latitude(),
                longitude: location.longitude(),
                nearby_stops_count: 0,
                stops_with_eta: Vec::new(),
                message: NO_STOPS_MESSAGE.to_string(),
            });
        }

        info!(count = stops.len(), "Fetching arrivals for nearby stops");
        let lookups = self.fetch_all_eta(&stops).await?;

        let stops_with_eta: Vec<StopWithEta> = stops
            .into_iter()
            .zip(lookups)
            .map(|(stop, lookup)| StopWithEta::new(stop, lookup, route))
            .collect();

        let failed = stops_with_eta.iter().filter(|s| s.is_failed()).count();
        if failed > 0 {
            warn!(failed, total = stops_with_eta.len(), "Some arrival lookups failed");
        }

        Ok(NearbyStopsOutcome::Found {
            address,
            latitude: location.latitude(),
            longitude: location.longitude(),
            nearby_stops_count: stops_with_eta.len(),
            stops_with_eta,
            search_radius_degrees: self.config.radius_degrees,
            route_filter: route.map(ToString::to_string),
        })
    }

    /// Stops near a location, without arrival estimates
    ///
    /// # Errors
    ///
    /// Only configuration errors are returned.
    #[instrument(skip(self))]
    pub async fn locate_stops(
        &self,
        query: StopQuery,
    ) -> Result<NearbyStopsListing, ApplicationError> {
        let address = query.address().map(ToString::to_string);
        let location = match self.resolve(&query).await? {
            Resolved::At(location) => location,
            Resolved::NotFound { address } => {
                return Ok(NearbyStopsListing::AddressNotFound {
                    error: ADDRESS_NOT_FOUND.to_string(),
                    address,
                    details: ADDRESS_NOT_FOUND_DETAILS.to_string(),
                });
            },
            Resolved::Failed { address, details } => {
                return Ok(NearbyStopsListing::GeocodingFailed {
                    error: "Geocoding failed".to_string(),
                    address,
                    details,
                });
            },
        };

        let nearby_stops = self
            .index
            .nearby(&location, self.config.radius_degrees)
            .await?;

        Ok(NearbyStopsListing::Located {
            address,
            latitude: location.latitude(),
            longitude: location.longitude(),
            nearby_stops,
            search_radius_degrees: self.config.radius_degrees,
        })
    }

    async fn resolve(&self, query: &StopQuery) -> Result<Resolved, ApplicationError> {
        match query {
            StopQuery::Coordinates(location) => Ok(Resolved::At(*location)),
            StopQuery::Address(address) => match self.geocoder.geocode(address).await {
                Ok(Some(location)) => {
                    debug!(%address, %location, "Geocoded address");
                    Ok(Resolved::At(location))
                },
                Ok(None) => {
                    warn!(%address, "Address not found");
                    Ok(Resolved::NotFound {
                        address: address.clone(),
                    })
                },
                Err(e) if e.is_configuration() => Err(e),
                Err(e) => {
                    warn!(%address, error = %e, "Geocoding failed");
                    Ok(Resolved::Failed {
                        address: address.clone(),
                        details: e.to_string(),
                    })
                },
            },
        }
    }

    /// One lookup per stop, in stop order, with bounded concurrency
    async fn fetch_all_eta(&self, stops: &[BusStop]) -> Result<Vec<EtaLookup>, ApplicationError> {
        let lookups: Vec<_> = stops
            .iter()
            .map(|stop| self.bus_data.fetch_stop_eta(&stop.stop_id))
            .collect();
        let results: Vec<Result<Vec<EtaEntry>, ApplicationError>> = stream::iter(lookups)
            .buffered(self.config.eta_fetch_concurrency.max(1))
            .collect()
            .await;

        results
            .into_iter()
            .zip(stops)
            .map(|(result, stop)| match result {
                Ok(entries) => Ok(EtaLookup::Available(entries)),
                Err(e) if e.is_configuration() => Err(e),
                Err(e) => {
                    warn!(stop_id = %stop.stop_id, error = %e, "Arrival lookup failed");
                    Ok(EtaLookup::Failed {
                        reason: e.to_string(),
                    })
                },
            })
            .collect()
    }
}
