//! Language and data-type selectors for the Hong Kong Observatory open data API

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Response language accepted by the upstream APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// English (`en`)
    #[serde(rename = "en")]
    English,
    /// Traditional Chinese (`tc`)
    #[default]
    #[serde(rename = "tc")]
    TraditionalChinese,
    /// Simplified Chinese (`sc`)
    #[serde(rename = "sc")]
    SimplifiedChinese,
}

impl Language {
    /// The query-string code for this language
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::TraditionalChinese => "tc",
            Self::SimplifiedChinese => "sc",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Self::English),
            "tc" => Ok(Self::TraditionalChinese),
            "sc" => Ok(Self::SimplifiedChinese),
            _ => Err(DomainError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Weather dataset published by the Observatory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherDataType {
    /// Local weather forecast
    #[serde(rename = "flw")]
    LocalForecast,
    /// 9-day weather forecast
    #[serde(rename = "fnd")]
    NineDayForecast,
    /// Current weather report (per-station readings)
    #[serde(rename = "rhrread")]
    CurrentReport,
    /// Weather warning summary
    #[serde(rename = "warnsum")]
    WarningSummary,
    /// Weather warning information
    #[serde(rename = "warningInfo")]
    WarningInfo,
    /// Special weather tips
    #[serde(rename = "swt")]
    SpecialTips,
}

impl WeatherDataType {
    /// The `dataType` query value for this dataset
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::LocalForecast => "flw",
            Self::NineDayForecast => "fnd",
            Self::CurrentReport => "rhrread",
            Self::WarningSummary => "warnsum",
            Self::WarningInfo => "warningInfo",
            Self::SpecialTips => "swt",
        }
    }
}

impl fmt::Display for WeatherDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for WeatherDataType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "flw" => Ok(Self::LocalForecast),
            "fnd" => Ok(Self::NineDayForecast),
            "rhrread" => Ok(Self::CurrentReport),
            "warnsum" => Ok(Self::WarningSummary),
            "warningInfo" => Ok(Self::WarningInfo),
            "swt" => Ok(Self::SpecialTips),
            _ => Err(DomainError::UnsupportedDataType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parses_codes() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("TC".parse::<Language>().unwrap(), Language::TraditionalChinese);
        assert_eq!(" sc ".parse::<Language>().unwrap(), Language::SimplifiedChinese);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn language_default_is_traditional_chinese() {
        assert_eq!(Language::default(), Language::TraditionalChinese);
    }

    #[test]
    fn data_type_round_trips_through_code() {
        for data_type in [
            WeatherDataType::LocalForecast,
            WeatherDataType::NineDayForecast,
            WeatherDataType::CurrentReport,
            WeatherDataType::WarningSummary,
            WeatherDataType::WarningInfo,
            WeatherDataType::SpecialTips,
        ] {
            assert_eq!(data_type.code().parse::<WeatherDataType>().unwrap(), data_type);
        }
    }

    #[test]
    fn data_type_is_case_sensitive() {
        assert!("warninginfo".parse::<WeatherDataType>().is_err());
        assert!("forecast".parse::<WeatherDataType>().is_err());
    }
}
