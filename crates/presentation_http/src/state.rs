//! Application state shared across handlers

use std::fmt;
use std::sync::Arc;

use application::{
    BusDataPort, FallbackDataPort, GeocodingPort, NearbyStationService, NearbyStopService,
    PlaceGeocodeCache, RouteService, StopIndexService, WeatherPort,
};
use infrastructure::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Stop spatial index
    pub stop_index: Arc<StopIndexService>,
    /// Nearby stops with arrival estimates
    pub nearby_stops: Arc<NearbyStopService>,
    /// Nearest weather stations
    pub nearby_stations: Arc<NearbyStationService>,
    /// Route listing
    pub routes: Arc<RouteService>,
    /// Weather datasets
    pub weather: Arc<dyn WeatherPort>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("stop_index", &self.stop_index)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the services over the given ports
    pub fn new(
        config: AppConfig,
        bus_data: Arc<dyn BusDataPort>,
        fallback: Arc<dyn FallbackDataPort>,
        geocoder: Arc<dyn GeocodingPort>,
        weather: Arc<dyn WeatherPort>,
    ) -> Self {
        let stop_index = Arc::new(StopIndexService::new(
            Arc::clone(&bus_data),
            Arc::clone(&fallback),
        ));
        let nearby_stops = NearbyStopService::new(
            Arc::clone(&geocoder),
            Arc::clone(&bus_data),
            Arc::clone(&stop_index),
            config.kmb.to_nearby_stop_config(),
        );
        let places = Arc::new(PlaceGeocodeCache::new(
            geocoder,
            config.hko.geocode_region.clone(),
        ));
        let nearby_stations = NearbyStationService::new(Arc::clone(&weather), places);
        let routes = RouteService::new(bus_data, fallback);

        Self {
            stop_index,
            nearby_stops: Arc::new(nearby_stops),
            nearby_stations: Arc::new(nearby_stations),
            routes: Arc::new(routes),
            weather,
            config: Arc::new(config),
        }
    }
}
