//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod bus_data_port;
mod fallback_data_port;
mod geocoding_port;
mod weather_port;

pub use bus_data_port::BusDataPort;
#[cfg(test)]
pub use bus_data_port::MockBusDataPort;
pub use fallback_data_port::FallbackDataPort;
#[cfg(test)]
pub use fallback_data_port::MockFallbackDataPort;
pub use geocoding_port::GeocodingPort;
#[cfg(test)]
pub use geocoding_port::MockGeocodingPort;
#[cfg(test)]
pub use weather_port::MockWeatherPort;
pub use weather_port::WeatherPort;
