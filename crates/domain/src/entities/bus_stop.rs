//! Bus stop entity

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{GeoLocation, LocalizedText};

/// A bus stop with its trilingual name and parsed coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusStop {
    /// Operator stop identifier (opaque, e.g. `18492910339410B1`)
    pub stop_id: String,
    /// Display name
    pub name: LocalizedText,
    /// Stop position
    pub location: GeoLocation,
}

impl BusStop {
    /// Create a stop from already-parsed coordinates
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if the stop id is blank.
    pub fn new(
        stop_id: impl Into<String>,
        name: LocalizedText,
        location: GeoLocation,
    ) -> Result<Self, DomainError> {
        let stop_id = stop_id.into();
        if stop_id.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "stop id must not be empty".to_string(),
            ));
        }
        Ok(Self {
            stop_id,
            name,
            location,
        })
    }

    /// Create a stop from coordinates given as decimal-degree text
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank or either coordinate cannot be parsed.
    pub fn from_text_coordinates(
        stop_id: impl Into<String>,
        name: LocalizedText,
        latitude: &str,
        longitude: &str,
    ) -> Result<Self, DomainError> {
        let location = GeoLocation::parse(latitude, longitude)?;
        Self::new(stop_id, name, location)
    }
}
