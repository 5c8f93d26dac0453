//! KMB bus handlers
//!
//! Routes, stops, nearby stops and nearby stops with arrival estimates.

use application::{
    DataSource, NearbyStopsListing, NearbyStopsOutcome, RouteListing, StopQuery,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use domain::{BusStop, GeoLocation};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Optional route filter
#[derive(Debug, Default, Deserialize)]
pub struct RouteQuery {
    /// Route number; blank means no filter
    pub route: Option<String>,
}

/// All stops of the current snapshot
#[derive(Debug, Serialize)]
pub struct StopListResponse {
    /// Where the snapshot came from
    pub source: DataSource,
    /// When the snapshot was published
    pub loaded_at: DateTime<Utc>,
    /// Number of stops
    pub count: usize,
    /// Stops in snapshot order
    pub stops: Vec<BusStop>,
}

/// Result of an explicit reload
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Stops in the new snapshot
    pub stop_count: usize,
    /// Where the new snapshot came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DataSource>,
}

/// Parse path coordinates, rejecting text that is not a decimal number
fn parse_coordinates(lat: &str, lon: &str) -> Result<GeoLocation, ApiError> {
    GeoLocation::parse(lat, lon).map_err(ApiError::from)
}

fn outcome_status(outcome: &NearbyStopsOutcome) -> StatusCode {
    match outcome {
        NearbyStopsOutcome::Found { .. } | NearbyStopsOutcome::NoStopsNearby { .. } => {
            StatusCode::OK
        },
        NearbyStopsOutcome::AddressNotFound { .. } => StatusCode::NOT_FOUND,
        NearbyStopsOutcome::GeocodingFailed { .. } => StatusCode::BAD_GATEWAY,
    }
}

fn listing_status(listing: &NearbyStopsListing) -> StatusCode {
    match listing {
        NearbyStopsListing::Located { .. } => StatusCode::OK,
        NearbyStopsListing::AddressNotFound { .. } => StatusCode::NOT_FOUND,
        NearbyStopsListing::GeocodingFailed { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// Route filter from a path or query value; blank means none
fn route_filter(route: Option<&str>) -> Option<&str> {
    route.map(str::trim).filter(|r| !r.is_empty())
}

/// `GET /v1/kmb/routes`
#[instrument(skip(state))]
pub async fn list_routes(State(state): State<AppState>) -> Result<Json<RouteListing>, ApiError> {
    Ok(Json(state.routes.list_routes(None).await?))
}

/// `GET /v1/kmb/routes/{route}`
#[instrument(skip(state))]
pub async fn get_route(
    State(state): State<AppState>,
    Path(route): Path<String>,
) -> Result<Json<RouteListing>, ApiError> {
    Ok(Json(state.routes.list_routes(Some(&route)).await?))
}

/// `GET /v1/kmb/stops`
#[instrument(skip(state))]
pub async fn list_stops(
    State(state): State<AppState>,
) -> Result<Json<StopListResponse>, ApiError> {
    let snapshot = state.stop_index.snapshot().await?;
    Ok(Json(StopListResponse {
        source: snapshot.source(),
        loaded_at: snapshot.loaded_at(),
        count: snapshot.len(),
        stops: snapshot.stops().to_vec(),
    }))
}

/// `POST /v1/kmb/stops/refresh`
#[instrument(skip(state))]
pub async fn refresh_stops(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let stop_count = state.stop_index.load().await?;
    info!(stop_count, "Stop index reloaded on request");
    Ok(Json(RefreshResponse {
        stop_count,
        source: state.stop_index.current().map(|s| s.source()),
    }))
}

/// `GET /v1/kmb/near_stop/ll/{lat}/{lon}`
#[instrument(skip(state))]
pub async fn near_stop_by_coordinates(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(String, String)>,
) -> Result<(StatusCode, Json<NearbyStopsListing>), ApiError> {
    let location = parse_coordinates(&lat, &lon)?;
    let listing = state
        .nearby_stops
        .locate_stops(StopQuery::Coordinates(location))
        .await?;
    Ok((listing_status(&listing), Json(listing)))
}

/// `GET /v1/kmb/near_stop/address/{address}`
#[instrument(skip(state))]
pub async fn near_stop_by_address(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<(StatusCode, Json<NearbyStopsListing>), ApiError> {
    let listing = state
        .nearby_stops
        .locate_stops(StopQuery::Address(address))
        .await?;
    Ok((listing_status(&listing), Json(listing)))
}

/// `GET /v1/kmb/eta/address/{address}`
#[instrument(skip(state))]
pub async fn eta_by_address(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<(StatusCode, Json<NearbyStopsOutcome>), ApiError> {
    let outcome = state
        .nearby_stops
        .find_stops_with_eta(StopQuery::Address(address), None)
        .await?;
    Ok((outcome_status(&outcome), Json(outcome)))
}

/// `GET /v1/kmb/eta/address/{address}/{route}`
#[instrument(skip(state))]
pub async fn eta_by_address_and_route(
    State(state): State<AppState>,
    Path((address, route)): Path<(String, String)>,
) -> Result<(StatusCode, Json<NearbyStopsOutcome>), ApiError> {
    let outcome = state
        .nearby_stops
        .find_stops_with_eta(StopQuery::Address(address), route_filter(Some(&route)))
        .await?;
    Ok((outcome_status(&outcome), Json(outcome)))
}

/// `GET /v1/kmb/eta/ll/{lat}/{lon}?route=`
#[instrument(skip(state))]
pub async fn eta_by_coordinates(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(String, String)>,
    Query(query): Query<RouteQuery>,
) -> Result<(StatusCode, Json<NearbyStopsOutcome>), ApiError> {
    let location = parse_coordinates(&lat, &lon)?;
    let outcome = state
        .nearby_stops
        .find_stops_with_eta(
            StopQuery::Coordinates(location),
            route_filter(query.route.as_deref()),
        )
        .await?;
    Ok((outcome_status(&outcome), Json(outcome)))
}
