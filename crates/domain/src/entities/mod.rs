//! Domain entities

mod bus_route;
mod bus_stop;
mod eta_entry;
mod local_forecast;
mod weather_reading;

pub use bus_route::BusRoute;
pub use bus_stop::BusStop;
pub use eta_entry::EtaEntry;
pub use local_forecast::LocalForecast;
pub use weather_reading::{CurrentWeatherReport, WeatherStationReading};
