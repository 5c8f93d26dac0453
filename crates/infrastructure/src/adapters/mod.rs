//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod file_fallback_store;
mod hko_weather_adapter;
mod kmb_bus_data_adapter;
mod nominatim_geocoding_adapter;

pub use file_fallback_store::FileFallbackStore;
pub use hko_weather_adapter::HkoWeatherAdapter;
pub use kmb_bus_data_adapter::KmbBusDataAdapter;
pub use nominatim_geocoding_adapter::NominatimGeocodingAdapter;
