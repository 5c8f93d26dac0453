//! Application services
//!
//! Services orchestrate the ports into the use cases exposed over HTTP.

mod nearby_station_service;
mod nearby_stop_service;
mod place_geocode_cache;
mod route_service;
mod stop_index_service;

pub use nearby_station_service::{
    DEFAULT_TOP_N, NearbyStation, NearbyStationService, NearbyStationsOutcome, UserCoordinates,
};
pub use nearby_stop_service::{
    DEFAULT_ETA_FETCH_CONCURRENCY, EtaLookup, NearbyStopConfig, NearbyStopService,
    NearbyStopsListing, NearbyStopsOutcome, StopQuery, StopWithEta,
};
pub use place_geocode_cache::{DEFAULT_GEOCODE_REGION, PlaceGeocodeCache};
pub use route_service::{RouteListing, RouteService};
pub use stop_index_service::{
    DEFAULT_NEAR_STOP_RADIUS_DEGREES, DataSource, StopIndexService, StopIndexSnapshot,
};
