//! Geographic location value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// Mean Earth radius in meters (IUGG)
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A geographic location with latitude and longitude in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees (-90 to 90)
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    longitude: f64,
}

impl GeoLocation {
    /// Create a new location with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180] (NaN is rejected as well).
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinates(format!(
                "{latitude}, {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse a location from decimal-degree text, as carried by the KMB payloads
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnparsableCoordinate` if either value is not a number,
    /// or `DomainError::InvalidCoordinates` if it is out of range.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, DomainError> {
        let lat = parse_coordinate("latitude", latitude)?;
        let lon = parse_coordinate("longitude", longitude)?;
        Self::new(lat, lon)
    }

    /// Create a location without validation (for trusted constants)
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to another location in meters
    ///
    /// Uses the Haversine formula. This is the metric used to rank weather
    /// stations; stop proximity uses [`GeoLocation::chebyshev_degrees`] instead.
    #[must_use]
    pub fn distance_meters(&self, other: &Self) -> f64 {
        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (lat1_rad.cos() * lat2_rad.cos()).mul_add(
            (delta_lon / 2.0).sin().powi(2),
            (delta_lat / 2.0).sin().powi(2),
        );
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_M * c
    }

    /// Largest per-axis difference to another location, in decimal degrees
    ///
    /// This is the L∞ metric behind the stop box filter: a stop is "within
    /// radius r" when both coordinate deltas are at most r.
    #[must_use]
    pub fn chebyshev_degrees(&self, other: &Self) -> f64 {
        (self.latitude - other.latitude)
            .abs()
            .max((self.longitude - other.longitude).abs())
    }

    /// Whether `other` lies inside the axis-aligned box of half-width `radius` degrees
    #[must_use]
    pub fn within_box(&self, other: &Self, radius: f64) -> bool {
        (self.latitude - other.latitude).abs() <= radius
            && (self.longitude - other.longitude).abs() <= radius
    }
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<f64, DomainError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| DomainError::UnparsableCoordinate {
            field,
            value: value.to_string(),
        })
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Well-known Hong Kong locations
impl GeoLocation {
    /// Tsim Sha Tsui, Kowloon
    #[must_use]
    pub const fn tsim_sha_tsui() -> Self {
        Self::new_unchecked(22.2976, 114.1722)
    }

    /// Central, Hong Kong Island
    #[must_use]
    pub const fn central() -> Self {
        Self::new_unchecked(22.2819, 114.1582)
    }

    /// Sha Tin, New Territories
    #[must_use]
    pub const fn sha_tin() -> Self {
        Self::new_unchecked(22.3817, 114.1886)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let loc = GeoLocation::new(22.3, 114.17).expect("valid coordinates");
        assert!((loc.latitude() - 22.3).abs() < f64::EPSILON);
        assert!((loc.longitude() - 114.17).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_coordinates() {
        assert!(GeoLocation::new(90.0, 180.0).is_ok());
        assert!(GeoLocation::new(-90.0, -180.0).is_ok());
        assert!(GeoLocation::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(GeoLocation::new(91.0, 0.0).is_err());
        assert!(GeoLocation::new(0.0, -181.0).is_err());
        assert!(GeoLocation::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_parse_text_coordinates() {
        let loc = GeoLocation::parse("22.345415", " 114.192640 ").expect("valid text");
        assert!((loc.latitude() - 22.345_415).abs() < 1e-9);
        assert!((loc.longitude() - 114.192_64).abs() < 1e-9);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = GeoLocation::parse("", "114.1").unwrap_err();
        assert!(matches!(
            err,
            DomainError::UnparsableCoordinate {
                field: "latitude",
                ..
            }
        ));
        assert!(GeoLocation::parse("22.3", "east").is_err());
        assert!(GeoLocation::parse("222.3", "114.1").is_err());
    }

    #[test]
    fn test_display() {
        let loc = GeoLocation::new(22.3, 114.17).expect("valid");
        assert_eq!(loc.to_string(), "22.300000, 114.170000");
    }

    #[test]
    fn test_distance_same_location() {
        let loc = GeoLocation::central();
        assert!(loc.distance_meters(&loc).abs() < 0.001);
    }

    #[test]
    fn test_distance_central_to_tsim_sha_tsui() {
        let d = GeoLocation::central().distance_meters(&GeoLocation::tsim_sha_tsui());
        // Roughly 2.2 km across the harbour
        assert!((d - 2_200.0).abs() < 200.0, "got {d}");
    }

    #[test]
    fn test_chebyshev_uses_largest_axis() {
        let a = GeoLocation::new_unchecked(22.0, 114.0);
        let b = GeoLocation::new_unchecked(22.001, 114.004);
        assert!((a.chebyshev_degrees(&b) - 0.004).abs() < 1e-12);
    }

    #[test]
    fn test_within_box_is_inclusive() {
        let a = GeoLocation::new_unchecked(22.0, 114.0);
        let edge = GeoLocation::new_unchecked(22.0, 114.5);
        assert!(a.within_box(&edge, 0.5));
        assert!(!a.within_box(&edge, 0.499));
    }

    #[test]
    fn test_serialization() {
        let loc = GeoLocation::new(22.3, 114.17).expect("valid");
        let json = serde_json::to_string(&loc).expect("serialize");
        assert_eq!(json, r#"{"latitude":22.3,"longitude":114.17}"#);
    }
}
