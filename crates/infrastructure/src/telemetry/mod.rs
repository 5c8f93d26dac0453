//! Logging initialization
//!
//! Console logging via `tracing-subscriber`, either human-readable text or
//! JSON lines, filtered through `RUST_LOG`.

mod logging;

pub use logging::{DEFAULT_LOG_FILTER, LogFormat, TelemetryError, init_logging};
