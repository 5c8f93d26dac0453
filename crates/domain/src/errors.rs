//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Coordinates outside the valid latitude/longitude range
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Coordinate text that is not a decimal number
    #[error("Invalid coordinate text for {field}: {value:?}")]
    UnparsableCoordinate {
        /// Which coordinate failed ("latitude" or "longitude")
        field: &'static str,
        /// The raw text as received
        value: String,
    },

    /// Unknown language code
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Unknown weather data type
    #[error("Unsupported weather data type: {0}")]
    UnsupportedDataType(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}
