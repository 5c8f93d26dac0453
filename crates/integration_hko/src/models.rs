//! HKO payload models
//!
//! Only the fields the service reads are modelled; the rest of each payload
//! is ignored.

use chrono::{DateTime, FixedOffset};
use domain::{CurrentWeatherReport, LocalForecast, WeatherStationReading};
use serde::{Deserialize, Serialize};

/// `rhrread`: current weather report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRegionalReport {
    /// Temperature readings per station
    pub temperature: RawTemperature,
    /// Report update time
    #[serde(default)]
    pub update_time: Option<String>,
}

/// Temperature block of a `rhrread` report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTemperature {
    /// One entry per station
    #[serde(default)]
    pub data: Vec<RawTemperatureReading>,
    /// When the readings were taken
    #[serde(default)]
    pub record_time: Option<String>,
}

/// One station temperature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTemperatureReading {
    /// Station place name, in the requested language
    pub place: String,
    /// Measured value
    pub value: f64,
    /// Unit, usually `"C"`
    #[serde(default)]
    pub unit: String,
}

/// `flw`: local weather forecast
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLocalForecast {
    /// Synoptic situation
    pub general_situation: String,
    /// Tropical cyclone information
    pub tc_info: String,
    /// Fire danger warning
    pub fire_danger_warning: String,
    /// Period covered
    pub forecast_period: String,
    /// Forecast text
    pub forecast_desc: String,
    /// Outlook for the following days
    pub outlook: String,
    /// Issue time, RFC 3339
    pub update_time: Option<String>,
}

fn parse_time(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

impl From<RawRegionalReport> for CurrentWeatherReport {
    fn from(raw: RawRegionalReport) -> Self {
        let record_time = parse_time(raw.temperature.record_time.as_deref());
        let temperatures = raw
            .temperature
            .data
            .into_iter()
            .map(|reading| WeatherStationReading {
                place: reading.place,
                value: reading.value,
                unit: reading.unit,
                record_time,
            })
            .collect();

        Self {
            record_time,
            temperatures,
        }
    }
}

impl From<RawLocalForecast> for LocalForecast {
    fn from(raw: RawLocalForecast) -> Self {
        Self {
            update_time: parse_time(raw.update_time.as_deref()),
            general_situation: raw.general_situation,
            tropical_cyclone_info: raw.tc_info,
            fire_danger_warning: raw.fire_danger_warning,
            forecast_period: raw.forecast_period,
            forecast_description: raw.forecast_desc,
            outlook: raw.outlook,
        }
    }
}
