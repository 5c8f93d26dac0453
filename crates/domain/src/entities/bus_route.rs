//! Bus route entity

use serde::{Deserialize, Serialize};

use crate::value_objects::LocalizedText;

/// One direction of one service variant of a bus route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusRoute {
    /// Route number as displayed on the bus (e.g. "1A")
    pub route: String,
    /// Direction: "O" (outbound) or "I" (inbound)
    pub bound: String,
    /// Service type ("1" is the normal service)
    pub service_type: String,
    /// Origin terminus
    pub origin: LocalizedText,
    /// Destination terminus
    pub destination: LocalizedText,
}

impl BusRoute {
    /// Whether this entry belongs to the given route number (case-insensitive)
    #[must_use]
    pub fn is_route(&self, route: &str) -> bool {
        self.route.eq_ignore_ascii_case(route.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_route_ignores_case_and_whitespace() {
        let route = BusRoute {
            route: "1A".to_string(),
            bound: "O".to_string(),
            service_type: "1".to_string(),
            origin: LocalizedText::new("STAR FERRY", "尖沙咀碼頭", "尖沙咀码头"),
            destination: LocalizedText::new("SAU MAU PING", "秀茂坪", "秀茂坪"),
        };
        assert!(route.is_route("1a"));
        assert!(route.is_route(" 1A "));
        assert!(!route.is_route("1"));
    }
}
