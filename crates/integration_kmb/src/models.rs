//! KMB payload models
//!
//! Every KMB list endpoint answers with the same envelope
//! (`type`, `version`, `generated_timestamp`, `data`). The raw rows are
//! converted to domain entities here; coordinate text is parsed and blank
//! timestamps become `None`.

use chrono::{DateTime, FixedOffset};
use domain::{BusRoute, BusStop, EtaEntry, LocalizedText};
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::error::KmbError;

/// The shared list envelope
#[derive(Debug, Deserialize)]
pub struct RawListResponse<T> {
    /// Payload type, e.g. `"StopList"`
    #[serde(default, rename = "type")]
    pub kind: String,
    /// API version
    #[serde(default)]
    pub version: String,
    /// When the payload was generated
    #[serde(default)]
    pub generated_timestamp: String,
    /// Rows
    pub data: Vec<T>,
}

/// A stop row; coordinates arrive as text
#[derive(Debug, Deserialize)]
pub struct RawStop {
    /// Stop identifier
    pub stop: String,
    /// English name
    #[serde(default)]
    pub name_en: String,
    /// Traditional Chinese name
    #[serde(default)]
    pub name_tc: String,
    /// Simplified Chinese name
    #[serde(default)]
    pub name_sc: String,
    /// Latitude as decimal text
    #[serde(deserialize_with = "text_or_number")]
    pub lat: String,
    /// Longitude as decimal text
    #[serde(deserialize_with = "text_or_number")]
    pub long: String,
}

/// A route row
#[derive(Debug, Deserialize)]
pub struct RawRoute {
    pub route: String,
    #[serde(default)]
    pub bound: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub service_type: String,
    #[serde(default)]
    pub orig_en: String,
    #[serde(default)]
    pub orig_tc: String,
    #[serde(default)]
    pub orig_sc: String,
    #[serde(default)]
    pub dest_en: String,
    #[serde(default)]
    pub dest_tc: String,
    #[serde(default)]
    pub dest_sc: String,
}

/// An arrival row for one stop
#[derive(Debug, Deserialize)]
pub struct RawEta {
    #[serde(default)]
    pub co: String,
    pub route: String,
    #[serde(default)]
    pub dir: String,
    #[serde(default, deserialize_with = "number_or_text")]
    pub service_type: u32,
    #[serde(default)]
    pub seq: u32,
    #[serde(default)]
    pub dest_en: String,
    #[serde(default)]
    pub dest_tc: String,
    #[serde(default)]
    pub dest_sc: String,
    #[serde(default)]
    pub eta_seq: u32,
    #[serde(default)]
    pub eta: Option<String>,
    #[serde(default)]
    pub rmk_en: String,
    #[serde(default)]
    pub rmk_tc: String,
    #[serde(default)]
    pub rmk_sc: String,
    #[serde(default)]
    pub data_timestamp: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
    })
}

fn number_or_text<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid service type {n}"))),
        TextOrNumber::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid service type {s:?}"))),
    }
}

/// Parse an optional RFC 3339 timestamp; blank or malformed text is `None`
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw).ok()
}

fn parse_envelope<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<Vec<T>, KmbError> {
    let envelope: RawListResponse<T> =
        serde_json::from_slice(body).map_err(|e| KmbError::ParseError(e.to_string()))?;
    Ok(envelope.data)
}

impl From<RawRoute> for BusRoute {
    fn from(raw: RawRoute) -> Self {
        Self {
            route: raw.route,
            bound: raw.bound,
            service_type: raw.service_type,
            origin: LocalizedText::new(raw.orig_en, raw.orig_tc, raw.orig_sc),
            destination: LocalizedText::new(raw.dest_en, raw.dest_tc, raw.dest_sc),
        }
    }
}

impl From<RawEta> for EtaEntry {
    fn from(raw: RawEta) -> Self {
        Self {
            eta: parse_timestamp(raw.eta.as_deref()),
            data_timestamp: parse_timestamp(raw.data_timestamp.as_deref()),
            route: raw.route,
            direction: raw.dir,
            service_type: raw.service_type,
            sequence: raw.seq,
            eta_sequence: raw.eta_seq,
            destination: LocalizedText::new(raw.dest_en, raw.dest_tc, raw.dest_sc),
            remark: LocalizedText::new(raw.rmk_en, raw.rmk_tc, raw.rmk_sc),
        }
    }
}

/// Parse a stop list payload
///
/// Rows whose coordinates cannot be parsed are skipped with a warning, so a
/// single bad row never costs the whole list.
///
/// # Errors
///
/// Returns `KmbError::ParseError` if the envelope itself is malformed.
pub fn parse_stop_list(body: &[u8]) -> Result<Vec<BusStop>, KmbError> {
    let rows: Vec<RawStop> = parse_envelope(body)?;
    let total = rows.len();

    let stops: Vec<BusStop> = rows
        .into_iter()
        .filter_map(|row| {
            let name = LocalizedText::new(row.name_en, row.name_tc, row.name_sc);
            match BusStop::from_text_coordinates(row.stop.clone(), name, &row.lat, &row.long) {
                Ok(stop) => Some(stop),
                Err(e) => {
                    warn!(stop_id = %row.stop, error = %e, "Skipping stop with invalid data");
                    None
                },
            }
        })
        .collect();

    if stops.len() < total {
        warn!(skipped = total - stops.len(), total, "Some stops were dropped while parsing");
    }
    Ok(stops)
}

/// Parse a route list payload
///
/// # Errors
///
/// Returns `KmbError::ParseError` if the payload is malformed.
pub fn parse_route_list(body: &[u8]) -> Result<Vec<BusRoute>, KmbError> {
    let rows: Vec<RawRoute> = parse_envelope(body)?;
    Ok(rows.into_iter().map(BusRoute::from).collect())
}

/// Parse a stop arrival payload
///
/// # Errors
///
/// Returns `KmbError::ParseError` if the payload is malformed.
pub fn parse_eta_list(body: &[u8]) -> Result<Vec<EtaEntry>, KmbError> {
    let rows: Vec<RawEta> = parse_envelope(body)?;
    Ok(rows.into_iter().map(EtaEntry::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOP_LIST: &str = r#"{
        "type": "StopList",
        "version": "1.0",
        "generated_timestamp": "2024-01-01T05:00:00+08:00",
        "data": [
            {"stop": "18492910339410B1", "name_en": "CHUK YUEN ESTATE BUS TERMINUS",
             "name_tc": "竹園邨總站", "name_sc": "竹园邨总站", "lat": "22.345415", "long": "114.192640"},
            {"stop": "BROKEN", "name_en": "NOWHERE", "name_tc": "", "name_sc": "", "lat": "", "long": "114.1"},
            {"stop": "NUMERIC", "name_en": "NUMBERS", "name_tc": "", "name_sc": "", "lat": 22.3, "long": 114.2}
        ]
    }"#;

    #[test]
    fn parses_stop_list_and_skips_bad_rows() {
        let stops = parse_stop_list(STOP_LIST.as_bytes()).unwrap();
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].stop_id, "18492910339410B1");
        assert_eq!(stops[0].name.tc, "竹園邨總站");
        assert!((stops[0].location.longitude() - 114.192_64).abs() < 1e-9);
        assert_eq!(stops[1].stop_id, "NUMERIC");
    }

    #[test]
    fn malformed_envelope_is_parse_error() {
        let err = parse_stop_list(b"{\"nope\": true}").unwrap_err();
        assert!(matches!(err, KmbError::ParseError(_)));
    }

    #[test]
    fn parses_route_list() {
        let body = r#"{"type":"RouteList","version":"1.0","generated_timestamp":"",
            "data":[{"route":"1A","bound":"O","service_type":"1",
                     "orig_en":"STAR FERRY","orig_tc":"尖沙咀碼頭","orig_sc":"尖沙咀码头",
                     "dest_en":"SAU MAU PING (CENTRAL)","dest_tc":"秀茂坪(中)","dest_sc":"秀茂坪(中)"}]}"#;
        let routes = parse_route_list(body.as_bytes()).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].route, "1A");
        assert_eq!(routes[0].service_type, "1");
        assert_eq!(routes[0].origin.en, "STAR FERRY");
    }

    #[test]
    fn parses_eta_list_with_missing_estimates() {
        let body = r#"{"type":"StopETA","version":"1.0","generated_timestamp":"2024-01-01T10:00:00+08:00",
            "data":[
              {"co":"KMB","route":"1A","dir":"O","service_type":1,"seq":3,
               "dest_tc":"秀茂坪(中)","dest_sc":"秀茂坪(中)","dest_en":"SAU MAU PING (CENTRAL)",
               "eta_seq":1,"eta":"2024-01-01T10:05:00+08:00",
               "rmk_tc":"","rmk_sc":"","rmk_en":"","data_timestamp":"2024-01-01T10:00:00+08:00"},
              {"co":"KMB","route":"1A","dir":"O","service_type":"1","seq":3,
               "dest_tc":"","dest_sc":"","dest_en":"",
               "eta_seq":2,"eta":"",
               "rmk_tc":"","rmk_sc":"","rmk_en":"Final Bus","data_timestamp":"2024-01-01T10:00:00+08:00"},
              {"co":"KMB","route":"2","dir":"I","service_type":1,"seq":7,
               "dest_tc":"","dest_sc":"","dest_en":"",
               "eta_seq":1,"eta":null,
               "rmk_tc":"","rmk_sc":"","rmk_en":"","data_timestamp":null}
            ]}"#;
        let entries = parse_eta_list(body.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].has_estimate());
        assert_eq!(entries[0].service_type, 1);
        assert!(!entries[1].has_estimate());
        assert_eq!(entries[1].remark.en, "Final Bus");
        assert!(entries[2].eta.is_none());
        assert!(entries[2].data_timestamp.is_none());
        assert_eq!(entries[2].direction, "I");
    }

    #[test]
    fn blank_timestamp_is_none() {
        assert!(parse_timestamp(Some("  ")).is_none());
        assert!(parse_timestamp(None).is_none());
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(Some("2024-01-01T10:05:00+08:00")).is_some());
    }
}
