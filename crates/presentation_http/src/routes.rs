//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // KMB routes and stops
        .route("/v1/kmb/routes", get(handlers::kmb::list_routes))
        .route("/v1/kmb/routes/{route}", get(handlers::kmb::get_route))
        .route("/v1/kmb/stops", get(handlers::kmb::list_stops))
        .route("/v1/kmb/stops/refresh", post(handlers::kmb::refresh_stops))
        // KMB proximity
        .route(
            "/v1/kmb/near_stop/ll/{lat}/{lon}",
            get(handlers::kmb::near_stop_by_coordinates),
        )
        .route(
            "/v1/kmb/near_stop/address/{address}",
            get(handlers::kmb::near_stop_by_address),
        )
        .route(
            "/v1/kmb/eta/address/{address}",
            get(handlers::kmb::eta_by_address),
        )
        .route(
            "/v1/kmb/eta/address/{address}/{route}",
            get(handlers::kmb::eta_by_address_and_route),
        )
        .route(
            "/v1/kmb/eta/ll/{lat}/{lon}",
            get(handlers::kmb::eta_by_coordinates),
        )
        // HKO weather
        .route("/v1/hko/flw", get(handlers::hko::local_forecast_default))
        .route(
            "/v1/hko/rhrread/{address}",
            get(handlers::hko::nearby_stations_default),
        )
        .route("/v1/hko/{lang}/flw", get(handlers::hko::local_forecast))
        .route(
            "/v1/hko/{lang}/data/{data_type}",
            get(handlers::hko::raw_data),
        )
        .route(
            "/v1/hko/{lang}/rhrread/{address}",
            get(handlers::hko::nearby_stations),
        )
        .with_state(state)
}
