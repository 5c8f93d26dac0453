//! Local snapshot store - Implements FallbackDataPort over JSON files
//!
//! The files hold the operator's list payload verbatim, so a saved API
//! response can be dropped into `res/` unchanged.

use std::path::{Path, PathBuf};

use application::error::ApplicationError;
use application::ports::FallbackDataPort;
use async_trait::async_trait;
use domain::{BusRoute, BusStop};
use integration_kmb::{parse_route_list, parse_stop_list};
use tracing::{error, info, instrument};

use crate::config::FallbackConfig;

/// Reads stop and route snapshots from disk
#[derive(Debug, Clone)]
pub struct FileFallbackStore {
    stop_path: PathBuf,
    route_path: PathBuf,
}

impl FileFallbackStore {
    /// Create a store reading the given files
    #[must_use]
    pub fn new(stop_path: impl Into<PathBuf>, route_path: impl Into<PathBuf>) -> Self {
        Self {
            stop_path: stop_path.into(),
            route_path: route_path.into(),
        }
    }

    /// Create a store from the `fallback` configuration section
    #[must_use]
    pub fn from_config(config: &FallbackConfig) -> Self {
        Self::new(config.stop_data_path(), config.route_data_path())
    }

    /// Path of the stop snapshot
    #[must_use]
    pub fn stop_path(&self) -> &Path {
        &self.stop_path
    }

    /// Path of the route snapshot
    #[must_use]
    pub fn route_path(&self) -> &Path {
        &self.route_path
    }

    async fn read(path: &Path) -> Result<Vec<u8>, ApplicationError> {
        tokio::fs::read(path).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to read local snapshot");
            ApplicationError::Internal(format!("cannot read {}: {e}", path.display()))
        })
    }
}

#[async_trait]
impl FallbackDataPort for FileFallbackStore {
    #[instrument(skip(self), fields(path = %self.stop_path.display()))]
    async fn load_stops(&self) -> Result<Vec<BusStop>, ApplicationError> {
        let body = Self::read(&self.stop_path).await?;
        let stops = parse_stop_list(&body).map_err(|e| {
            ApplicationError::Internal(format!("{}: {e}", self.stop_path.display()))
        })?;
        info!(count = stops.len(), "Loaded stop data from local snapshot");
        Ok(stops)
    }

    #[instrument(skip(self), fields(path = %self.route_path.display()))]
    async fn load_routes(&self) -> Result<Vec<BusRoute>, ApplicationError> {
        let body = Self::read(&self.route_path).await?;
        let routes = parse_route_list(&body).map_err(|e| {
            ApplicationError::Internal(format!("{}: {e}", self.route_path.display()))
        })?;
        info!(count = routes.len(), "Loaded route data from local snapshot");
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: &str = r#"{
        "type": "StopList",
        "version": "1.0",
        "generated_timestamp": "2024-01-01T10:00:00+08:00",
        "data": [
            {
                "stop": "18492910339410B1",
                "name_en": "CHUK YUEN ESTATE BUS TERMINUS",
                "name_tc": "竹園邨總站",
                "name_sc": "竹园邨总站",
                "lat": "22.345415",
                "long": "114.192640"
            },
            {
                "stop": "BROKEN",
                "name_en": "NO COORDINATES",
                "name_tc": "",
                "name_sc": "",
                "lat": "",
                "long": ""
            }
        ]
    }"#;

    const ROUTES: &str = r#"{
        "type": "RouteList",
        "version": "1.0",
        "generated_timestamp": "2024-01-01T10:00:00+08:00",
        "data": [
            {
                "route": "1",
                "bound": "O",
                "service_type": "1",
                "orig_en": "CHUK YUEN ESTATE",
                "orig_tc": "竹園邨",
                "orig_sc": "竹园邨",
                "dest_en": "STAR FERRY",
                "dest_tc": "尖沙咀碼頭",
                "dest_sc": "尖沙咀码头"
            }
        ]
    }"#;

    fn store_in(dir: &tempfile::TempDir) -> FileFallbackStore {
        let config = FallbackConfig {
            base_folder: dir.path().to_path_buf(),
            ..Default::default()
        };
        FileFallbackStore::from_config(&config)
    }

    fn write_res(dir: &tempfile::TempDir, name: &str, contents: &str) {
        let res = dir.path().join("res");
        std::fs::create_dir_all(&res).unwrap();
        std::fs::write(res.join(name), contents).unwrap();
    }

    #[tokio::test]
    async fn loads_stops_skipping_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_res(&dir, "kmb_stop_data.json", STOPS);

        let stops = store_in(&dir).load_stops().await.unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].stop_id, "18492910339410B1");
    }

    #[tokio::test]
    async fn loads_routes() {
        let dir = tempfile::tempdir().unwrap();
        write_res(&dir, "kmb_route_data.json", ROUTES);

        let routes = store_in(&dir).load_routes().await.unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].destination.en, "STAR FERRY");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = store_in(&dir).load_stops().await.unwrap_err();
        assert!(matches!(err, ApplicationError::Internal(_)));
        assert!(!err.is_configuration());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_res(&dir, "kmb_route_data.json", "<html>not json</html>");
        assert!(store_in(&dir).load_routes().await.is_err());
    }

    #[test]
    fn paths_follow_config() {
        let store = FileFallbackStore::from_config(&FallbackConfig::default());
        assert!(store.stop_path().ends_with("res/kmb_stop_data.json"));
        assert!(store.route_path().ends_with("res/kmb_route_data.json"));
    }
}
