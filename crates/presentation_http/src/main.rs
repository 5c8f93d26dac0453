//! HK bus & weather HTTP server
//!
//! Main entry point for the HTTP API server.

use std::{sync::Arc, time::Duration};

use application::{BusDataPort, FallbackDataPort, GeocodingPort, WeatherPort};
use infrastructure::{
    AppConfig, DEFAULT_LOG_FILTER, FileFallbackStore, HkoWeatherAdapter, KmbBusDataAdapter,
    LogFormat, NominatimGeocodingAdapter, WarningSeverity, init_logging,
};
use presentation_http::{AppState, routes};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration comes first so the log format can follow it
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    let format = config
        .server
        .log_format
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Text);
    init_logging(format, DEFAULT_LOG_FILTER)?;

    info!("HK bus & weather server v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }

    for warning in config.validate() {
        match warning.severity {
            WarningSeverity::Warning => warn!("{warning}"),
            WarningSeverity::Info => info!("{warning}"),
        }
    }

    info!(
        host = %config.server.host,
        port = %config.server.port,
        fallback_folder = %config.fallback.base_folder.display(),
        "Configuration loaded"
    );

    let bus_data: Arc<dyn BusDataPort> =
        Arc::new(KmbBusDataAdapter::new(&config.kmb.to_kmb_config(&config.http))?);
    let weather: Arc<dyn WeatherPort> =
        Arc::new(HkoWeatherAdapter::new(config.hko.to_hko_config(&config.http))?);
    let geocoder: Arc<dyn GeocodingPort> = Arc::new(NominatimGeocodingAdapter::new(
        &config.geocoding.to_nominatim_config(&config.http),
    )?);
    let fallback: Arc<dyn FallbackDataPort> =
        Arc::new(FileFallbackStore::from_config(&config.fallback));

    let cors_layer = cors_layer(&config.server.allowed_origins);
    let addr = config.server.bind_address();
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    let state = AppState::new(config, bus_data, fallback, geocoder, weather);

    // Warm the stop index; requests arriving earlier load it on demand
    let stop_index = Arc::clone(&state.stop_index);
    tokio::spawn(async move {
        if let Err(e) = stop_index.ensure_loaded().await {
            warn!(error = %e, "Initial stop index load failed");
        }
    });

    let app = routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer),
    );

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// Any origin when none are configured, otherwise only the listed ones
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use axum::http::{HeaderValue, Method};
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    }
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }

    info!("Waiting up to {:?} for connections to close", timeout);
}
