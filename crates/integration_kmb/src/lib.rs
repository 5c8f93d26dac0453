//! KMB bus open-data integration
//!
//! Client for the KMB/LWB real-time arrival API at
//! [data.etabus.gov.hk](https://data.etabus.gov.hk): the route list, the stop list
//! and per-stop arrival estimates.
//!
//! # Architecture
//!
//! [`KmbClient`] defines the interface, implemented by [`HttpKmbClient`].
//! Raw payloads are validated and converted to domain entities at this boundary
//! (coordinates parsed from text, blank ETA strings mapped to `None`), so the
//! list parsers in [`models`] are also used to read bundled fallback files.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_kmb::{HttpKmbClient, KmbClient, KmbConfig};
//!
//! let client = HttpKmbClient::new(&KmbConfig::default())?;
//! let arrivals = client.fetch_stop_eta("18492910339410B1").await?;
//! ```

mod client;
mod config;
mod error;
pub mod models;

pub use client::{HttpKmbClient, KmbClient};
pub use config::KmbConfig;
pub use error::KmbError;
pub use models::{parse_eta_list, parse_route_list, parse_stop_list};
