//! Address geocoding via Nominatim
//!
//! Converts free-form Hong Kong addresses and place names to coordinates using
//! the [Nominatim](https://nominatim.openstreetmap.org) search API. Requests are
//! paced to respect the public instance's usage policy.

mod nominatim;

pub use nominatim::{GeocodingClient, GeocodingError, NominatimConfig, NominatimGeocodingClient};
