//! Domain layer for the Hong Kong bus & weather aggregator
//!
//! Contains the bus-stop, route, ETA and weather-reading entities together with
//! the geographic value objects used by the proximity lookups.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
