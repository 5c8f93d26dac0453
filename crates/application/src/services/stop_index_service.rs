//! Stop spatial index
//!
//! Keeps the known stop set together with an R-tree over the stop coordinates
//! and answers "stops within a box of half-width r around a point".
//!
//! The stop list and its tree form one immutable [`StopIndexSnapshot`]; a
//! reload builds a fresh snapshot and publishes it with a single atomic swap,
//! so concurrent readers always see a matching (stops, tree) pair.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use domain::{BusStop, GeoLocation};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{BusDataPort, FallbackDataPort};

/// Default search half-width in decimal degrees
pub const DEFAULT_NEAR_STOP_RADIUS_DEGREES: f64 = 0.003;

/// Envelope padding so float rounding at the box edge never drops a candidate;
/// the exact box test runs afterwards.
const ENVELOPE_PADDING: f64 = 1e-9;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Where a data set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Live operator API
    Upstream,
    /// Bundled snapshot file
    Fallback,
    /// Neither source answered
    Unavailable,
}

/// Immutable pairing of the stop list and the tree over its coordinates
///
/// Point data `i` in the tree is the index of stop `i` in the list.
pub struct StopIndexSnapshot {
    stops: Vec<BusStop>,
    tree: RTree<IndexedPoint>,
    source: DataSource,
    loaded_at: DateTime<Utc>,
}

impl fmt::Debug for StopIndexSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopIndexSnapshot")
            .field("stops", &self.stops.len())
            .field("source", &self.source)
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}

impl StopIndexSnapshot {
    /// Build a snapshot, bulk-loading the tree from the stop coordinates
    #[must_use]
    pub fn build(stops: Vec<BusStop>, source: DataSource) -> Self {
        let points = stops
            .iter()
            .enumerate()
            .map(|(i, stop)| {
                GeomWithData::new([stop.location.latitude(), stop.location.longitude()], i)
            })
            .collect();

        Self {
            tree: RTree::bulk_load(points),
            stops,
            source,
            loaded_at: Utc::now(),
        }
    }

    /// A snapshot with no stops
    #[must_use]
    pub fn empty() -> Self {
        Self::build(Vec::new(), DataSource::Unavailable)
    }

    /// All stops, in load order
    #[must_use]
    pub fn stops(&self) -> &[BusStop] {
        &self.stops
    }

    /// Number of stops
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the snapshot holds no stops
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Origin of the stop list
    #[must_use]
    pub const fn source(&self) -> DataSource {
        self.source
    }

    /// When the snapshot was built
    #[must_use]
    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Stops with `|lat - center.lat| <= radius` and `|lon - center.lon| <= radius`
    ///
    /// Sorted by ascending Chebyshev distance, ties in load order. A negative or
    /// non-finite radius matches nothing.
    #[must_use]
    pub fn query_radius(&self, center: &GeoLocation, radius: f64) -> Vec<&BusStop> {
        if !radius.is_finite() || radius < 0.0 {
            return Vec::new();
        }

        let pad = radius + ENVELOPE_PADDING;
        let envelope = AABB::from_corners(
            [center.latitude() - pad, center.longitude() - pad],
            [center.latitude() + pad, center.longitude() + pad],
        );

        let mut hits: Vec<(f64, usize)> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|point| point.data)
            .filter(|&i| center.within_box(&self.stops[i].location, radius))
            .map(|i| (center.chebyshev_degrees(&self.stops[i].location), i))
            .collect();

        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, i)| &self.stops[i]).collect()
    }
}

/// Owns the published stop snapshot and its reload policy
pub struct StopIndexService {
    bus_data: Arc<dyn BusDataPort>,
    fallback: Arc<dyn FallbackDataPort>,
    snapshot: ArcSwapOption<StopIndexSnapshot>,
    load_lock: Mutex<()>,
}

impl fmt::Debug for StopIndexService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopIndexService")
            .field("snapshot", &self.current())
            .finish_non_exhaustive()
    }
}

impl StopIndexService {
    /// Create an index that loads lazily on first use
    pub fn new(bus_data: Arc<dyn BusDataPort>, fallback: Arc<dyn FallbackDataPort>) -> Self {
        Self {
            bus_data,
            fallback,
            snapshot: ArcSwapOption::empty(),
            load_lock: Mutex::new(()),
        }
    }

    /// Fetch the stop set, rebuild the index and publish it
    ///
    /// Upstream failures fall back to the local snapshot; if that fails too an
    /// empty snapshot is published and `Ok(0)` returned. Only configuration
    /// errors are returned, and they leave the current snapshot in place.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<usize, ApplicationError> {
        let _guard = self.load_lock.lock().await;
        self.load_locked().await
    }

    /// Load once if nothing was ever published; concurrent callers share that load
    pub async fn ensure_loaded(&self) -> Result<(), ApplicationError> {
        if self.snapshot.load().is_some() {
            return Ok(());
        }

        let _guard = self.load_lock.lock().await;
        if self.snapshot.load().is_none() {
            debug!("No stop snapshot yet, loading");
            self.load_locked().await?;
        }
        Ok(())
    }

    /// The current snapshot, if one was ever published
    pub fn current(&self) -> Option<Arc<StopIndexSnapshot>> {
        self.snapshot.load_full()
    }

    /// Box query against the current snapshot; empty before the first load
    pub fn query_radius(&self, center: &GeoLocation, radius: f64) -> Vec<BusStop> {
        self.current()
            .map(|snapshot| {
                snapshot
                    .query_radius(center, radius)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Load on first use, then run the box query
    pub async fn nearby(
        &self,
        center: &GeoLocation,
        radius: f64,
    ) -> Result<Vec<BusStop>, ApplicationError> {
        self.ensure_loaded().await?;
        let stops = self.query_radius(center, radius);
        debug!(%center, radius, count = stops.len(), "Stops near point");
        Ok(stops)
    }

    /// The loaded snapshot, loading it first if needed
    pub async fn snapshot(&self) -> Result<Arc<StopIndexSnapshot>, ApplicationError> {
        self.ensure_loaded().await?;
        Ok(self
            .current()
            .unwrap_or_else(|| Arc::new(StopIndexSnapshot::empty())))
    }

    async fn load_locked(&self) -> Result<usize, ApplicationError> {
        let (stops, source) = match self.bus_data.fetch_stops().await {
            Ok(stops) => (stops, DataSource::Upstream),
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Stop list fetch failed, using local snapshot");
                match self.fallback.load_stops().await {
                    Ok(stops) => (stops, DataSource::Fallback),
                    Err(fe) => {
                        error!(error = %fe, "Local stop snapshot unavailable, index will be empty");
                        (Vec::new(), DataSource::Unavailable)
                    },
                }
            },
        };

        let snapshot = StopIndexSnapshot::build(stops, source);
        let count = snapshot.len();
        self.snapshot.store(Some(Arc::new(snapshot)));

        info!(count, ?source, "Stop index published");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use domain::{BusRoute, EtaEntry, LocalizedText};
    use tokio::sync::Notify;

    use super::*;
    use crate::ports::{MockBusDataPort, MockFallbackDataPort};

    fn stop(id: &str, lat: f64, lon: f64) -> BusStop {
        BusStop::new(
            id,
            LocalizedText::new(id, id, id),
            GeoLocation::new(lat, lon).unwrap(),
        )
        .unwrap()
    }

    fn sample_stops() -> Vec<BusStop> {
        vec![
            stop("FAR", 22.40, 114.20),
            stop("EDGE", 22.3000, 114.1725),
            stop("NEAR", 22.3001, 114.1701),
            stop("CENTER", 22.3000, 114.1700),
        ]
    }

    fn ids(stops: &[BusStop]) -> Vec<&str> {
        stops.iter().map(|s| s.stop_id.as_str()).collect()
    }

    #[test]
    fn snapshot_query_sorts_by_chebyshev_distance() {
        let snapshot = StopIndexSnapshot::build(sample_stops(), DataSource::Upstream);
        let center = GeoLocation::new(22.3, 114.17).unwrap();

        let hits: Vec<&str> = snapshot
            .query_radius(&center, 0.003)
            .into_iter()
            .map(|s| s.stop_id.as_str())
            .collect();

        assert_eq!(hits, vec!["CENTER", "NEAR", "EDGE"]);
    }

    #[test]
    fn snapshot_query_ties_keep_load_order() {
        let stops = vec![stop("B", 22.5, 114.0), stop("A", 21.5, 114.0)];
        let snapshot = StopIndexSnapshot::build(stops, DataSource::Upstream);
        let center = GeoLocation::new(22.0, 114.0).unwrap();

        let hits: Vec<&str> = snapshot
            .query_radius(&center, 1.0)
            .into_iter()
            .map(|s| s.stop_id.as_str())
            .collect();

        assert_eq!(hits, vec!["B", "A"]);
    }

    #[test]
    fn snapshot_query_rejects_bad_radius() {
        let snapshot = StopIndexSnapshot::build(sample_stops(), DataSource::Upstream);
        let center = GeoLocation::new(22.3, 114.17).unwrap();
        assert!(snapshot.query_radius(&center, -1.0).is_empty());
        assert!(snapshot.query_radius(&center, f64::NAN).is_empty());
    }

    #[test]
    fn empty_snapshot_returns_nothing() {
        let snapshot = StopIndexSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.source(), DataSource::Unavailable);
        assert!(
            snapshot
                .query_radius(&GeoLocation::central(), 10.0)
                .is_empty()
        );
    }

    #[tokio::test]
    async fn load_uses_upstream() {
        let mut bus = MockBusDataPort::new();
        bus.expect_fetch_stops()
            .times(1)
            .returning(|| Ok(sample_stops()));
        let fallback = MockFallbackDataPort::new();

        let index = StopIndexService::new(Arc::new(bus), Arc::new(fallback));
        let count = index.load().await.unwrap();

        assert_eq!(count, 4);
        let snapshot = index.current().unwrap();
        assert_eq!(snapshot.source(), DataSource::Upstream);
    }

    #[tokio::test]
    async fn load_falls_back_to_local_snapshot() {
        let mut bus = MockBusDataPort::new();
        bus.expect_fetch_stops()
            .returning(|| Err(ApplicationError::ExternalService("HTTP 503".into())));
        let mut fallback = MockFallbackDataPort::new();
        fallback
            .expect_load_stops()
            .times(1)
            .returning(|| Ok(vec![stop("FILE", 22.3, 114.17)]));

        let index = StopIndexService::new(Arc::new(bus), Arc::new(fallback));
        assert_eq!(index.load().await.unwrap(), 1);
        assert_eq!(index.current().unwrap().source(), DataSource::Fallback);
    }

    #[tokio::test]
    async fn load_publishes_empty_snapshot_when_everything_fails() {
        let mut bus = MockBusDataPort::new();
        bus.expect_fetch_stops()
            .returning(|| Err(ApplicationError::ExternalService("timeout".into())));
        let mut fallback = MockFallbackDataPort::new();
        fallback
            .expect_load_stops()
            .returning(|| Err(ApplicationError::Internal("missing file".into())));

        let index = StopIndexService::new(Arc::new(bus), Arc::new(fallback));
        assert_eq!(index.load().await.unwrap(), 0);

        let snapshot = index.current().unwrap();
        assert!(snapshot.is_empty());
        assert!(
            index
                .nearby(&GeoLocation::central(), 0.003)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn configuration_error_propagates_without_fallback() {
        let mut bus = MockBusDataPort::new();
        bus.expect_fetch_stops().returning(|| {
            Err(ApplicationError::Configuration(
                "kmb.stop_list_url is not configured".into(),
            ))
        });
        let mut fallback = MockFallbackDataPort::new();
        fallback.expect_load_stops().never();

        let index = StopIndexService::new(Arc::new(bus), Arc::new(fallback));
        let err = index.load().await.unwrap_err();

        assert!(err.is_configuration());
        assert!(index.current().is_none());
    }

    #[tokio::test]
    async fn ensure_loaded_twice_fetches_once() {
        let mut bus = MockBusDataPort::new();
        bus.expect_fetch_stops()
            .times(1)
            .returning(|| Ok(sample_stops()));

        let index = StopIndexService::new(Arc::new(bus), Arc::new(MockFallbackDataPort::new()));
        index.ensure_loaded().await.unwrap();
        index.ensure_loaded().await.unwrap();

        assert_eq!(index.current().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn concurrent_first_callers_trigger_one_load() {
        let mut bus = MockBusDataPort::new();
        bus.expect_fetch_stops()
            .times(1)
            .returning(|| Ok(sample_stops()));

        let index = Arc::new(StopIndexService::new(
            Arc::new(bus),
            Arc::new(MockFallbackDataPort::new()),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                tokio::spawn(async move { index.ensure_loaded().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(index.current().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn nearby_loads_lazily_and_queries() {
        let mut bus = MockBusDataPort::new();
        bus.expect_fetch_stops()
            .times(1)
            .returning(|| Ok(sample_stops()));

        let index = StopIndexService::new(Arc::new(bus), Arc::new(MockFallbackDataPort::new()));
        assert!(index.current().is_none());

        let center = GeoLocation::new(22.3, 114.17).unwrap();
        let stops = index.nearby(&center, 0.0002).await.unwrap();
        assert_eq!(ids(&stops), vec!["CENTER", "NEAR"]);
    }

    /// Port whose second fetch blocks until released, to observe a reload in flight
    struct GatedBusData {
        calls: AtomicUsize,
        gate: Notify,
    }

    #[async_trait]
    impl BusDataPort for GatedBusData {
        async fn fetch_routes(&self) -> Result<Vec<BusRoute>, ApplicationError> {
            Ok(Vec::new())
        }

        async fn fetch_stops(&self) -> Result<Vec<BusStop>, ApplicationError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![stop("OLD", 22.3, 114.17)])
            } else {
                self.gate.notified().await;
                Ok(vec![stop("NEW1", 22.3, 114.17), stop("NEW2", 22.3001, 114.17)])
            }
        }

        async fn fetch_stop_eta(&self, _stop_id: &str) -> Result<Vec<EtaEntry>, ApplicationError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn readers_keep_old_snapshot_until_reload_publishes() {
        let bus = Arc::new(GatedBusData {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
        });
        let index = Arc::new(StopIndexService::new(
            Arc::clone(&bus) as Arc<dyn BusDataPort>,
            Arc::new(MockFallbackDataPort::new()),
        ));
        index.load().await.unwrap();

        let reloader = {
            let index = Arc::clone(&index);
            tokio::spawn(async move { index.load().await })
        };
        tokio::task::yield_now().await;

        let center = GeoLocation::new(22.3, 114.17).unwrap();
        let during = index.query_radius(&center, 0.003);
        assert_eq!(ids(&during), vec!["OLD"]);

        bus.gate.notify_one();
        assert_eq!(reloader.await.unwrap().unwrap(), 2);

        let after = index.query_radius(&center, 0.003);
        assert_eq!(ids(&after), vec!["NEW1", "NEW2"]);
    }
}
