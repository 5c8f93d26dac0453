//! Local weather forecast

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// The Observatory's local weather forecast bulletin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalForecast {
    /// Synoptic situation
    pub general_situation: String,
    /// Tropical cyclone information (often empty)
    pub tropical_cyclone_info: String,
    /// Fire danger warning (often empty)
    pub fire_danger_warning: String,
    /// Period the forecast covers
    pub forecast_period: String,
    /// Forecast text
    pub forecast_description: String,
    /// Outlook for the following days
    pub outlook: String,
    /// Bulletin issue time
    pub update_time: Option<DateTime<FixedOffset>>,
}
