//! Weather station readings from the current weather report

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single measurement reported by a named station
///
/// Readings carry no coordinates; the place name is the only handle
/// for locating the station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStationReading {
    /// Station place name, in the requested language
    pub place: String,
    /// Measured value
    pub value: f64,
    /// Unit of the value (e.g. "C")
    pub unit: String,
    /// When the reading was recorded
    pub record_time: Option<DateTime<FixedOffset>>,
}

/// The temperature section of a current weather report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherReport {
    /// Record time shared by all readings
    pub record_time: Option<DateTime<FixedOffset>>,
    /// One reading per station
    pub temperatures: Vec<WeatherStationReading>,
}

impl CurrentWeatherReport {
    /// Station place names, first occurrence order, without duplicates
    #[must_use]
    pub fn distinct_places(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.temperatures
            .iter()
            .map(|r| r.place.as_str())
            .filter(|place| seen.insert(*place))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(place: &str, value: f64) -> WeatherStationReading {
        WeatherStationReading {
            place: place.to_string(),
            value,
            unit: "C".to_string(),
            record_time: None,
        }
    }

    #[test]
    fn distinct_places_keeps_first_occurrence_order() {
        let report = CurrentWeatherReport {
            record_time: None,
            temperatures: vec![
                reading("Sha Tin", 18.0),
                reading("Tai Po", 17.0),
                reading("Sha Tin", 18.5),
            ],
        };
        assert_eq!(report.distinct_places(), vec!["Sha Tin", "Tai Po"]);
    }
}
