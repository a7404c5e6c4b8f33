// Static airspace reference data: runways and restricted zones
//
// Both are supplied by the caller. Coordinates are optional so that one
// incomplete record only removes its own pairings from evaluation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runway {
    #[serde(default)]
    pub id: String,
    /// Runway designator, e.g. "04/22"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Degrees true
    #[serde(default)]
    pub heading: Option<f64>,
    /// Meters
    #[serde(default)]
    pub length: Option<f64>,
}

impl Runway {
    /// Display name, falling back to the id when the name is missing
    pub fn label(&self) -> &str {
        label(&self.name, &self.id)
    }

    /// Threshold reference point if present and finite
    pub fn position(&self) -> Option<(f64, f64)> {
        finite_point(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictedZone {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Meters
    #[serde(default)]
    pub radius: Option<f64>,
    /// Free-form category: "airport", "military", "sensitive", ...
    #[serde(rename = "type", default)]
    pub zone_type: String,
}

impl RestrictedZone {
    pub fn label(&self) -> &str {
        label(&self.name, &self.id)
    }

    /// Centre point and radius if all are present, finite, and the radius is not negative
    pub fn circle(&self) -> Option<(f64, f64, f64)> {
        let (lat, lon) = finite_point(self.lat, self.lon)?;
        match self.radius {
            Some(radius) if radius.is_finite() && radius >= 0.0 => Some((lat, lon, radius)),
            _ => None,
        }
    }
}

fn finite_point(lat: Option<f64>, lon: Option<f64>) -> Option<(f64, f64)> {
    match (lat, lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
        _ => None,
    }
}

fn label<'a>(name: &'a str, id: &'a str) -> &'a str {
    if name.is_empty() {
        id
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runway_deserialize() {
        let json = r#"{"id": "RWY01", "number": "04/22", "name": "LaGuardia 04/22",
                       "lat": 40.7769, "lon": -73.8740, "heading": 40, "length": 2134}"#;
        let runway: Runway = serde_json::from_str(json).unwrap();
        assert_eq!(runway.position(), Some((40.7769, -73.8740)));
        assert_eq!(runway.length, Some(2134.0));
    }

    #[test]
    fn test_runway_missing_coordinates() {
        let runway: Runway = serde_json::from_str(r#"{"id": "RWY09", "name": "Closed", "lat": 40.0}"#).unwrap();
        assert!(runway.position().is_none());
    }

    #[test]
    fn test_zone_type_field() {
        let json = r#"{"id": "RZ003", "name": "Military Zone", "lat": 40.8, "lon": -73.95,
                       "radius": 2500, "type": "military"}"#;
        let zone: RestrictedZone = serde_json::from_str(json).unwrap();
        assert_eq!(zone.zone_type, "military");
        assert_eq!(zone.circle(), Some((40.8, -73.95, 2500.0)));

        let value = serde_json::to_value(&zone).unwrap();
        assert_eq!(value["type"], "military");
    }

    #[test]
    fn test_records_without_name() {
        let runway: Runway =
            serde_json::from_str(r#"{"id": "RWY02", "lat": 40.64, "lon": -73.78, "heading": 130}"#).unwrap();
        assert_eq!(runway.name, "");
        assert_eq!(runway.label(), "RWY02");
        assert_eq!(runway.position(), Some((40.64, -73.78)));

        let zone: RestrictedZone = serde_json::from_str(r#"{"lat": 40.8, "lon": -73.95, "radius": 100}"#).unwrap();
        assert_eq!(zone.label(), "");
        assert_eq!(zone.circle(), Some((40.8, -73.95, 100.0)));

        let named: RestrictedZone = serde_json::from_str(r#"{"id": "RZ9", "name": "Park"}"#).unwrap();
        assert_eq!(named.label(), "Park");
    }

    #[test]
    fn test_zone_without_radius() {
        let zone = RestrictedZone {
            id: "RZ004".to_string(),
            name: "Unsized".to_string(),
            lat: Some(40.0),
            lon: Some(-74.0),
            radius: None,
            zone_type: String::new(),
        };
        assert!(zone.circle().is_none());
    }
}
