//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod localized_text;
mod weather_query;

pub use geo_location::GeoLocation;
pub use localized_text::LocalizedText;
pub use weather_query::{Language, WeatherDataType};
