//! Place-name geocode cache
//!
//! Weather stations are identified by place names that never move, so their
//! coordinates are resolved once per process. Only hits are stored; a place
//! that failed to resolve is retried on the next lookup.

use std::fmt;
use std::sync::Arc;

use domain::GeoLocation;
use moka::future::Cache;
use tracing::{debug, warn};

use crate::error::ApplicationError;
use crate::ports::GeocodingPort;

/// Default region appended to every lookup
pub const DEFAULT_GEOCODE_REGION: &str = "Hong Kong";

/// Why a lookup produced nothing; never stored in the cache
#[derive(Debug)]
enum Unresolved {
    Miss,
    Configuration(String),
}

/// Memoizing front of a [`GeocodingPort`] keyed by "place, region"
pub struct PlaceGeocodeCache {
    geocoder: Arc<dyn GeocodingPort>,
    region: String,
    cache: Cache<String, GeoLocation>,
}

impl fmt::Debug for PlaceGeocodeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceGeocodeCache")
            .field("region", &self.region)
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl PlaceGeocodeCache {
    /// Create an empty, unbounded cache
    pub fn new(geocoder: Arc<dyn GeocodingPort>, region: impl Into<String>) -> Self {
        Self {
            geocoder,
            region: region.into(),
            cache: Cache::builder().build(),
        }
    }

    /// Region suffix used for lookups
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The text sent to the geocoder for a place
    pub fn query_for(&self, place: &str) -> String {
        let place = place.trim();
        let region = self.region.trim();
        if region.is_empty() {
            place.to_string()
        } else {
            format!("{place}, {region}")
        }
    }

    /// Resolve a place name, consulting the cache first
    ///
    /// Provider failures are logged and reported as `Ok(None)`, exactly like a
    /// place that does not exist. Concurrent lookups of the same key share a
    /// single provider call.
    ///
    /// # Errors
    ///
    /// Configuration errors from the geocoder are returned unchanged.
    pub async fn resolve(&self, place: &str) -> Result<Option<GeoLocation>, ApplicationError> {
        let query = self.query_for(place);
        if place.trim().is_empty() {
            return Ok(None);
        }
        let key = query.to_lowercase();

        if let Some(hit) = self.cache.get(&key).await {
            debug!(%query, "Place geocode cache hit");
            return Ok(Some(hit));
        }

        let geocoder = Arc::clone(&self.geocoder);
        let lookup = self
            .cache
            .try_get_with(key, async move {
                match geocoder.geocode(&query).await {
                    Ok(Some(location)) => {
                        debug!(%query, %location, "Geocoded place");
                        Ok(location)
                    },
                    Ok(None) => {
                        warn!(%query, "Could not geocode place");
                        Err(Unresolved::Miss)
                    },
                    Err(ApplicationError::Configuration(msg)) => {
                        Err(Unresolved::Configuration(msg))
                    },
                    Err(e) => {
                        warn!(%query, error = %e, "Geocoding error");
                        Err(Unresolved::Miss)
                    },
                }
            })
            .await;

        match lookup {
            Ok(location) => Ok(Some(location)),
            Err(unresolved) => match unresolved.as_ref() {
                Unresolved::Miss => Ok(None),
                Unresolved::Configuration(msg) => {
                    Err(ApplicationError::Configuration(msg.clone()))
                },
            },
        }
    }

    /// Whether a place is already cached
    pub async fn contains(&self, place: &str) -> bool {
        let key = self.query_for(place).to_lowercase();
        self.cache.get(&key).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockGeocodingPort;

    fn kings_park() -> GeoLocation {
        GeoLocation::new(22.3117, 114.1726).unwrap()
    }

    #[test]
    fn query_appends_region() {
        let cache = PlaceGeocodeCache::new(Arc::new(MockGeocodingPort::new()), "Hong Kong");
        assert_eq!(cache.query_for(" King's Park "), "King's Park, Hong Kong");

        let bare = PlaceGeocodeCache::new(Arc::new(MockGeocodingPort::new()), "");
        assert_eq!(bare.query_for("Sha Tin"), "Sha Tin");
    }

    #[tokio::test]
    async fn hit_is_cached() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder
            .expect_geocode()
            .withf(|q| q == "King's Park, Hong Kong")
            .times(1)
            .returning(|_| Ok(Some(kings_park())));

        let cache = PlaceGeocodeCache::new(Arc::new(geocoder), DEFAULT_GEOCODE_REGION);

        assert_eq!(cache.resolve("King's Park").await.unwrap(), Some(kings_park()));
        assert_eq!(cache.resolve("king's park").await.unwrap(), Some(kings_park()));
        assert!(cache.contains("King's Park").await);
    }

    #[tokio::test]
    async fn miss_is_not_cached() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder.expect_geocode().times(2).returning(|_| Ok(None));

        let cache = PlaceGeocodeCache::new(Arc::new(geocoder), DEFAULT_GEOCODE_REGION);

        assert_eq!(cache.resolve("Nowhere").await.unwrap(), None);
        assert_eq!(cache.resolve("Nowhere").await.unwrap(), None);
        assert!(!cache.contains("Nowhere").await);
    }

    #[tokio::test]
    async fn provider_error_is_a_miss() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder
            .expect_geocode()
            .times(1)
            .returning(|_| Err(ApplicationError::ExternalService("timeout".into())));

        let cache = PlaceGeocodeCache::new(Arc::new(geocoder), DEFAULT_GEOCODE_REGION);
        assert_eq!(cache.resolve("Tsuen Wan").await.unwrap(), None);
    }

    #[tokio::test]
    async fn configuration_error_is_returned_and_not_cached() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder.expect_geocode().times(2).returning(|_| {
            Err(ApplicationError::Configuration(
                "geocoding.base_url is not configured".into(),
            ))
        });

        let cache = PlaceGeocodeCache::new(Arc::new(geocoder), DEFAULT_GEOCODE_REGION);

        for _ in 0..2 {
            let err = cache.resolve("Sha Tin").await.unwrap_err();
            assert!(err.is_configuration());
        }
        assert!(!cache.contains("Sha Tin").await);
    }

    #[tokio::test]
    async fn blank_place_skips_provider() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder.expect_geocode().never();

        let cache = PlaceGeocodeCache::new(Arc::new(geocoder), DEFAULT_GEOCODE_REGION);
        assert_eq!(cache.resolve("   ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_lookups_converge() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder
            .expect_geocode()
            .returning(|_| Ok(Some(kings_park())));

        let cache = Arc::new(PlaceGeocodeCache::new(
            Arc::new(geocoder),
            DEFAULT_GEOCODE_REGION,
        ));

        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.resolve("King's Park").await.unwrap() })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap(), Some(kings_park()));
        }
    }
}
