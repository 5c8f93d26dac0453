//! Nearest weather station workflow
//!
//! Ranks the stations of the current weather report by great-circle distance
//! from a user address. Station coordinates come from geocoding their place
//! names through [`PlaceGeocodeCache`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use domain::{GeoLocation, Language};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::WeatherPort;
use crate::services::place_geocode_cache::PlaceGeocodeCache;

/// Default number of stations returned
pub const DEFAULT_TOP_N: usize = 1;

/// Coordinates of the user address
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UserCoordinates {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

/// A station with its reading and distance from the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStation {
    /// Station place name
    pub place: String,
    /// Temperature reading
    pub value: f64,
    /// Unit of `value`
    pub unit: String,
    /// Geocoded latitude
    pub lat: f64,
    /// Geocoded longitude
    pub lon: f64,
    /// Distance from the user in meters, two decimals
    pub distance_m: f64,
}

/// Result of the nearest station workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NearbyStationsOutcome {
    /// Stations ranked by distance
    Found {
        /// Address as given
        user_address: String,
        /// Where the address was geocoded
        user_coordinates: UserCoordinates,
        /// When the report was recorded
        record_time: Option<DateTime<FixedOffset>>,
        /// Nearest first, at most `top_n`
        nearby_stations: Vec<NearbyStation>,
    },
    /// The report could not be fetched
    WeatherUnavailable {
        /// Summary
        error: String,
        /// Upstream failure
        details: String,
    },
    /// None of the report's stations could be located
    NoStationsGeocoded {
        /// Summary
        error: String,
    },
    /// The user address could not be located
    AddressNotFound {
        /// Summary naming the address
        error: String,
        /// Address as given
        address: String,
    },
}

impl NearbyStationsOutcome {
    /// Whether the workflow produced a ranking
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Finds the weather stations closest to an address
pub struct NearbyStationService {
    weather: Arc<dyn WeatherPort>,
    places: Arc<PlaceGeocodeCache>,
}

impl fmt::Debug for NearbyStationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NearbyStationService")
            .field("places", &self.places)
            .finish_non_exhaustive()
    }
}

fn round_to_centimeters(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}

impl NearbyStationService {
    /// Create the workflow
    pub fn new(weather: Arc<dyn WeatherPort>, places: Arc<PlaceGeocodeCache>) -> Self {
        Self { weather, places }
    }

    /// The `top_n` stations nearest to `address`, nearest first
    ///
    /// Stations whose place name cannot be geocoded are left out. Equal
    /// distances keep report order.
    ///
    /// # Errors
    ///
    /// Only configuration errors are returned, whether from the weather
    /// source or the geocoder.
    #[instrument(skip(self))]
    pub async fn find_nearby_stations(
        &self,
        address: &str,
        lang: Language,
        top_n: usize,
    ) -> Result<NearbyStationsOutcome, ApplicationError> {
        let report = match self.weather.fetch_current_report(lang).await {
            Ok(report) => report,
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Current weather report unavailable");
                return Ok(NearbyStationsOutcome::WeatherUnavailable {
                    error: "Failed to fetch weather data".to_string(),
                    details: e.to_string(),
                });
            },
        };

        let mut stations: Vec<(NearbyStation, GeoLocation)> = Vec::new();
        for reading in &report.temperatures {
            if let Some(location) = self.places.resolve(&reading.place).await? {
                stations.push((
                    NearbyStation {
                        place: reading.place.clone(),
                        value: reading.value,
                        unit: reading.unit.clone(),
                        lat: location.latitude(),
                        lon: location.longitude(),
                        distance_m: 0.0,
                    },
                    location,
                ));
            }
        }

        if stations.is_empty() {
            warn!(readings = report.temperatures.len(), "No station could be geocoded");
            return Ok(NearbyStationsOutcome::NoStationsGeocoded {
                error: "Could not geocode weather stations".to_string(),
            });
        }
        info!(geocoded = stations.len(), "Weather stations located");

        let Some(user) = self.places.resolve(address).await? else {
            warn!(%address, "Could not geocode user address");
            return Ok(NearbyStationsOutcome::AddressNotFound {
                error: format!("Could not geocode address: {address}"),
                address: address.to_string(),
            });
        };

        let mut ranked: Vec<NearbyStation> = stations
            .into_iter()
            .map(|(mut station, location)| {
                station.distance_m = round_to_centimeters(user.distance_meters(&location));
                station
            })
            .collect();
        // Stable: equal distances keep report order
        ranked.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        ranked.truncate(top_n);

        Ok(NearbyStationsOutcome::Found {
            user_address: address.to_string(),
            user_coordinates: UserCoordinates {
                lat: user.latitude(),
                lon: user.longitude(),
            },
            record_time: report.record_time,
            nearby_stations: ranked,
        })
    }
}
