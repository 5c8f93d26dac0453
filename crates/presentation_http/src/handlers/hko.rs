//! HKO weather handlers

use application::NearbyStationsOutcome;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use domain::{Language, LocalForecast, WeatherDataType};
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// Optional station count
#[derive(Debug, Default, Deserialize)]
pub struct TopNQuery {
    /// Stations to return; defaults to `hko.default_top_n`
    pub top_n: Option<usize>,
}

fn parse_language(lang: &str) -> Result<Language, ApiError> {
    lang.parse::<Language>().map_err(ApiError::from)
}

fn station_status(outcome: &NearbyStationsOutcome) -> StatusCode {
    match outcome {
        NearbyStationsOutcome::Found { .. } => StatusCode::OK,
        NearbyStationsOutcome::AddressNotFound { .. } => StatusCode::NOT_FOUND,
        NearbyStationsOutcome::WeatherUnavailable { .. }
        | NearbyStationsOutcome::NoStationsGeocoded { .. } => StatusCode::BAD_GATEWAY,
    }
}

async fn forecast(state: &AppState, lang: Language) -> Result<Json<LocalForecast>, ApiError> {
    Ok(Json(state.weather.fetch_local_forecast(lang).await?))
}

async fn stations(
    state: &AppState,
    lang: Language,
    address: &str,
    top_n: Option<usize>,
) -> Result<(StatusCode, Json<NearbyStationsOutcome>), ApiError> {
    let top_n = top_n.unwrap_or(state.config.hko.default_top_n);
    let outcome = state
        .nearby_stations
        .find_nearby_stations(address, lang, top_n)
        .await?;
    Ok((station_status(&outcome), Json(outcome)))
}

/// `GET /v1/hko/{lang}/flw`
#[instrument(skip(state))]
pub async fn local_forecast(
    State(state): State<AppState>,
    Path(lang): Path<String>,
) -> Result<Json<LocalForecast>, ApiError> {
    forecast(&state, parse_language(&lang)?).await
}

/// `GET /v1/hko/flw`, in the configured default language
#[instrument(skip(state))]
pub async fn local_forecast_default(
    State(state): State<AppState>,
) -> Result<Json<LocalForecast>, ApiError> {
    let lang = state.config.hko.default_lang;
    forecast(&state, lang).await
}

/// `GET /v1/hko/{lang}/data/{data_type}`
#[instrument(skip(state))]
pub async fn raw_data(
    State(state): State<AppState>,
    Path((lang, data_type)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lang = parse_language(&lang)?;
    let data_type = data_type.parse::<WeatherDataType>()?;
    Ok(Json(state.weather.fetch_raw(data_type, lang).await?))
}

/// `GET /v1/hko/{lang}/rhrread/{address}?top_n=`
#[instrument(skip(state))]
pub async fn nearby_stations(
    State(state): State<AppState>,
    Path((lang, address)): Path<(String, String)>,
    Query(query): Query<TopNQuery>,
) -> Result<(StatusCode, Json<NearbyStationsOutcome>), ApiError> {
    stations(&state, parse_language(&lang)?, &address, query.top_n).await
}

/// `GET /v1/hko/rhrread/{address}?top_n=`, in the configured default language
#[instrument(skip(state))]
pub async fn nearby_stations_default(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<TopNQuery>,
) -> Result<(StatusCode, Json<NearbyStationsOutcome>), ApiError> {
    let lang = state.config.hko.default_lang;
    stations(&state, lang, &address, query.top_n).await
}
