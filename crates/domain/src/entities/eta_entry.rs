//! Estimated-time-of-arrival entries for a stop

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::value_objects::LocalizedText;

/// One upcoming arrival of a route at a stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtaEntry {
    /// Route number
    pub route: String,
    /// Direction: "O" or "I"
    pub direction: String,
    /// Service type
    pub service_type: u32,
    /// Stop sequence along the route
    pub sequence: u32,
    /// Index of this arrival among the upcoming arrivals (1 = next bus)
    pub eta_sequence: u32,
    /// Destination of the bus
    pub destination: LocalizedText,
    /// Estimated arrival; `None` means no estimate is available (e.g. last bus left)
    pub eta: Option<DateTime<FixedOffset>>,
    /// Operator remark (e.g. "Scheduled Bus")
    pub remark: LocalizedText,
    /// When the operator generated this estimate
    pub data_timestamp: Option<DateTime<FixedOffset>>,
}

impl EtaEntry {
    /// Whether the entry belongs to the given route number
    #[must_use]
    pub fn serves_route(&self, route: &str) -> bool {
        self.route == route
    }

    /// Whether an arrival estimate is present
    #[must_use]
    pub const fn has_estimate(&self) -> bool {
        self.eta.is_some()
    }
}
