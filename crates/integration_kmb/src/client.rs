//! KMB HTTP client
//!
//! Fetches the route list, the stop list and per-stop arrival estimates from
//! the KMB open-data API.

use std::time::Duration;

use async_trait::async_trait;
use domain::{BusRoute, BusStop, EtaEntry};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{KmbConfig, STOP_ID_PLACEHOLDER};
use crate::error::KmbError;
use crate::models::{parse_eta_list, parse_route_list, parse_stop_list};

/// Trait for KMB data clients
#[async_trait]
pub trait KmbClient: Send + Sync {
    /// Fetch every route operated by KMB
    async fn fetch_routes(&self) -> Result<Vec<BusRoute>, KmbError>;

    /// Fetch every KMB stop
    async fn fetch_stops(&self) -> Result<Vec<BusStop>, KmbError>;

    /// Fetch the arrival estimates for all routes calling at one stop
    async fn fetch_stop_eta(&self, stop_id: &str) -> Result<Vec<EtaEntry>, KmbError>;
}

/// reqwest-based client for the KMB open-data API
#[derive(Debug)]
pub struct HttpKmbClient {
    client: Client,
    config: KmbConfig,
}

impl HttpKmbClient {
    /// Create a new KMB client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &KmbConfig) -> Result<Self, KmbError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| KmbError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Validate a configured endpoint
    fn endpoint(name: &str, raw: &str) -> Result<Url, KmbError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(KmbError::ConfigurationError(format!(
                "kmb.{name} is not configured"
            )));
        }
        Url::parse(raw)
            .map_err(|e| KmbError::ConfigurationError(format!("kmb.{name} is not a valid URL: {e}")))
    }

    /// Build the arrival URL for one stop from the configured template
    fn stop_eta_url(&self, stop_id: &str) -> Result<Url, KmbError> {
        let template = &self.config.stop_eta_url_template;
        if !template.contains(STOP_ID_PLACEHOLDER) {
            return Err(KmbError::ConfigurationError(format!(
                "kmb.stop_eta_url_template must contain {STOP_ID_PLACEHOLDER}"
            )));
        }
        Self::endpoint(
            "stop_eta_url_template",
            &template.replace(STOP_ID_PLACEHOLDER, stop_id.trim()),
        )
    }

    /// GET a URL and return the raw body of a successful response
    async fn get_body(&self, url: Url) -> Result<Vec<u8>, KmbError> {
        debug!(%url, "Requesting KMB data");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                KmbError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                }
            } else {
                KmbError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(KmbError::RateLimitExceeded {
                retry_after_secs: response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok()),
            });
        }

        if !status.is_success() {
            return Err(KmbError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| KmbError::ParseError(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl KmbClient for HttpKmbClient {
    #[instrument(skip(self))]
    async fn fetch_routes(&self) -> Result<Vec<BusRoute>, KmbError> {
        let url = Self::endpoint("route_list_url", &self.config.route_list_url)?;
        let body = self.get_body(url).await?;
        let routes = parse_route_list(&body)?;
        debug!(count = routes.len(), "Fetched KMB routes");
        Ok(routes)
    }

    #[instrument(skip(self))]
    async fn fetch_stops(&self) -> Result<Vec<BusStop>, KmbError> {
        let url = Self::endpoint("stop_list_url", &self.config.stop_list_url)?;
        let body = self.get_body(url).await?;
        let stops = parse_stop_list(&body)?;
        debug!(count = stops.len(), "Fetched KMB stops");
        Ok(stops)
    }

    #[instrument(skip(self))]
    async fn fetch_stop_eta(&self, stop_id: &str) -> Result<Vec<EtaEntry>, KmbError> {
        let url = self.stop_eta_url(stop_id)?;
        let body = self.get_body(url).await?;
        let entries = parse_eta_list(&body)?;
        debug!(%stop_id, count = entries.len(), "Fetched stop arrivals");
        Ok(entries)
    }
}
