//! Hong Kong Observatory weather integration
//!
//! Client for the HKO open-data weather API
//! (<https://data.weather.gov.hk/weatherAPI/opendata/weather.php>).
//! Every dataset is addressed by a data type code and a language code; the
//! current weather report (`rhrread`) and local forecast (`flw`) are decoded
//! into domain types, everything else is passed through as JSON.

pub mod client;
mod models;

pub use client::{HkoClient, HkoConfig, HkoError, HttpHkoClient};
pub use models::{RawLocalForecast, RawRegionalReport, RawTemperature, RawTemperatureReading};
