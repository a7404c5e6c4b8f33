// Safety alert rules
//
// Every rule is a pure function over the latest position snapshot and the
// static airspace data. Rules do not see each other's output.

pub mod approach;
pub mod deviation;
pub mod landing;
pub mod proximity;
pub mod restricted;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::airspace::{RestrictedZone, Runway};
use crate::constants::*;
use crate::position::PositionReport;

pub use landing::{LandingAssessor, SentinelAssessor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    Warning,
}

/// Alert discriminant, mirrors the `type` field of [`AlertKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertType {
    ProximityAlert,
    UnstableApproach,
    UnsafeLandingConditions,
    RestrictedAirspaceViolation,
    RestrictedAirspaceProximity,
    PathDeviation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AircraftPosition {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl From<(f64, f64, f64)> for AircraftPosition {
    fn from((lat, lon, alt): (f64, f64, f64)) -> Self {
        AircraftPosition { lat, lon, alt }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneCircle {
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
}

/// Rule-specific alert content. Serialized with a `type` tag and
/// camelCase field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum AlertKind {
    ProximityAlert {
        aircraft1: String,
        aircraft2: String,
        distance: f64,
        vertical_separation: f64,
        position1: AircraftPosition,
        position2: AircraftPosition,
    },
    UnstableApproach {
        aircraft_id: String,
        runway: String,
        runway_position: LatLon,
        aircraft_position: AircraftPosition,
        distance_to_runway: f64,
        altitude: f64,
        speed: f64,
        issues: Vec<String>,
    },
    UnsafeLandingConditions {
        aircraft_id: String,
        aircraft_position: AircraftPosition,
        altitude: f64,
        speed: Option<f64>,
        reason: String,
    },
    RestrictedAirspaceViolation {
        aircraft_id: String,
        zone: String,
        zone_type: String,
        zone_position: ZoneCircle,
        aircraft_position: AircraftPosition,
        distance_from_center: f64,
    },
    RestrictedAirspaceProximity {
        aircraft_id: String,
        zone: String,
        zone_type: String,
        zone_position: ZoneCircle,
        aircraft_position: AircraftPosition,
        distance_from_center: f64,
        distance_to_edge: f64,
    },
    PathDeviation {
        aircraft_id: String,
        deviation: f64,
        planned_route: Vec<[f64; 2]>,
        current_position: AircraftPosition,
        closest_segment: usize,
        target_runway: Option<String>,
    },
}

impl AlertKind {
    pub fn alert_type(&self) -> AlertType {
        match self {
            AlertKind::ProximityAlert { .. } => AlertType::ProximityAlert,
            AlertKind::UnstableApproach { .. } => AlertType::UnstableApproach,
            AlertKind::UnsafeLandingConditions { .. } => AlertType::UnsafeLandingConditions,
            AlertKind::RestrictedAirspaceViolation { .. } => AlertType::RestrictedAirspaceViolation,
            AlertKind::RestrictedAirspaceProximity { .. } => AlertType::RestrictedAirspaceProximity,
            AlertKind::PathDeviation { .. } => AlertType::PathDeviation,
        }
    }

    /// Aircraft involved, one or two
    pub fn aircraft(&self) -> Vec<&str> {
        match self {
            AlertKind::ProximityAlert { aircraft1, aircraft2, .. } => vec![aircraft1.as_str(), aircraft2.as_str()],
            AlertKind::UnstableApproach { aircraft_id, .. }
            | AlertKind::UnsafeLandingConditions { aircraft_id, .. }
            | AlertKind::RestrictedAirspaceViolation { aircraft_id, .. }
            | AlertKind::RestrictedAirspaceProximity { aircraft_id, .. }
            | AlertKind::PathDeviation { aircraft_id, .. } => vec![aircraft_id.as_str()],
        }
    }
}

/// An immutable alert fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(flatten)]
    pub kind: AlertKind,
    pub severity: Severity,
    /// Evaluation time, milliseconds since the epoch
    pub timestamp: i64,
    pub message: String,
}

impl Alert {
    pub fn alert_type(&self) -> AlertType {
        self.kind.alert_type()
    }
}

/// Alert thresholds. Defaults reproduce the service's fixed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertConfig {
    pub proximity_horizontal_m: f64,
    pub proximity_vertical_m: f64,
    pub approach_distance_m: f64,
    pub approach_alt_high_m: f64,
    pub approach_alt_low_m: f64,
    pub approach_low_alt_min_distance_m: f64,
    pub approach_speed_high_kt: f64,
    pub restricted_zone_buffer_m: f64,
    pub path_deviation_m: f64,
    /// Flat-earth scale for route projection; the deviation threshold is
    /// calibrated against 111 km/degree over short routes
    pub meters_per_degree: f64,
    /// Aircraft flagged by the default landing assessor
    pub unsafe_landing_ids: Vec<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        AlertConfig {
            proximity_horizontal_m: PROXIMITY_HORIZONTAL_M,
            proximity_vertical_m: PROXIMITY_VERTICAL_M,
            approach_distance_m: APPROACH_DISTANCE_M,
            approach_alt_high_m: APPROACH_ALT_HIGH_M,
            approach_alt_low_m: APPROACH_ALT_LOW_M,
            approach_low_alt_min_distance_m: APPROACH_LOW_ALT_MIN_DISTANCE_M,
            approach_speed_high_kt: APPROACH_SPEED_HIGH_KT,
            restricted_zone_buffer_m: RESTRICTED_ZONE_BUFFER_M,
            path_deviation_m: PATH_DEVIATION_M,
            meters_per_degree: METERS_PER_DEGREE,
            unsafe_landing_ids: vec![UNSAFE_LANDING_SENTINEL.to_string()],
        }
    }
}

/// Runs all five rules over one snapshot
pub struct AlertEngine {
    config: AlertConfig,
    landing: Box<dyn LandingAssessor>,
}

impl AlertEngine {
    /// Engine with the sentinel landing assessor built from `config`
    pub fn new(config: AlertConfig) -> Self {
        let landing = Box::new(SentinelAssessor::new(config.unsafe_landing_ids.iter().cloned()));
        AlertEngine { config, landing }
    }

    /// Replace the landing-safety capability
    pub fn with_landing_assessor(mut self, landing: Box<dyn LandingAssessor>) -> Self {
        self.landing = landing;
        self
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Evaluate every rule. Output order: proximity, unstable approach,
    /// restricted airspace, path deviation, unsafe landing.
    pub fn evaluate(
        &self,
        positions: &[PositionReport],
        runways: &[Runway],
        zones: &[RestrictedZone],
        now_ms: i64,
    ) -> Vec<Alert> {
        let mut alerts = proximity::check_proximity(positions, &self.config, now_ms);
        alerts.extend(approach::check_unstable_approach(positions, runways, &self.config, now_ms));
        alerts.extend(restricted::check_restricted_airspace(positions, zones, &self.config, now_ms));
        alerts.extend(deviation::check_path_deviation(positions, &self.config, now_ms));
        alerts.extend(landing::check_unsafe_landing(positions, runways, self.landing.as_ref(), now_ms));

        if !alerts.is_empty() {
            info!(count = alerts.len(), aircraft = positions.len(), "Alerts detected");
        }
        alerts
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        AlertEngine::new(AlertConfig::default())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::position::PositionReport;

    pub fn aircraft(id: &str, lat: f64, lon: f64, alt: f64) -> PositionReport {
        PositionReport {
            aircraft_id: id.to_string(),
            lat,
            lon,
            alt,
            quality: 90.0,
            num_receivers: 5,
            timestamp: 1000.0,
            receivers: Vec::new(),
            speed: None,
            route: None,
            target_runway: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::aircraft;
    use super::*;

    #[test]
    fn test_alert_serializes_type_tag() {
        let alert = Alert {
            kind: AlertKind::RestrictedAirspaceProximity {
                aircraft_id: "UAL123".to_string(),
                zone: "JFK Restricted".to_string(),
                zone_type: "airport".to_string(),
                zone_position: ZoneCircle { lat: 40.6413, lon: -73.7781, radius: 3000.0 },
                aircraft_position: AircraftPosition { lat: 40.67, lon: -73.77, alt: 900.0 },
                distance_from_center: 3400.0,
                distance_to_edge: 400.0,
            },
            severity: Severity::Warning,
            timestamp: 1_700_000_000_000,
            message: "approaching".to_string(),
        };

        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["type"], "RESTRICTED_AIRSPACE_PROXIMITY");
        assert_eq!(value["severity"], "WARNING");
        assert_eq!(value["aircraftId"], "UAL123");
        assert_eq!(value["zoneType"], "airport");
        assert_eq!(value["distanceToEdge"], 400.0);
        assert_eq!(value["zonePosition"]["radius"], 3000.0);
    }

    #[test]
    fn test_no_false_positives() {
        let positions = vec![
            aircraft("UAL123", 40.70, -74.00, 3000.0),
            aircraft("DAL456", 40.75, -74.00, 3000.0),
            aircraft("AAL789", 40.70, -73.90, 3100.0),
        ];
        let runways = vec![Runway {
            id: "RWY01".to_string(),
            number: None,
            name: "Far Field 09".to_string(),
            lat: Some(41.50),
            lon: Some(-74.00),
            heading: Some(90.0),
            length: Some(2500.0),
        }];
        let zones = vec![RestrictedZone {
            id: "RZ001".to_string(),
            name: "Far Zone".to_string(),
            lat: Some(40.20),
            lon: Some(-74.00),
            radius: Some(2000.0),
            zone_type: "military".to_string(),
        }];

        let alerts = AlertEngine::default().evaluate(&positions, &runways, &zones, 0);
        assert!(alerts.is_empty(), "unexpected alerts: {:?}", alerts);
    }

    #[test]
    fn test_evaluate_rule_order() {
        let mut unsafe_ac = aircraft("UNSAFE01", 47.0, 8.0, 1000.0);
        unsafe_ac.route = Some(vec![[47.0, 8.0], [47.0, 8.5]]);
        let positions = vec![aircraft("A", 47.0, 8.0, 1000.0), unsafe_ac];

        let alerts = AlertEngine::default().evaluate(&positions, &[], &[], 42);
        let types: Vec<AlertType> = alerts.iter().map(|a| a.alert_type()).collect();
        assert_eq!(types, vec![AlertType::ProximityAlert, AlertType::UnsafeLandingConditions]);
        assert!(alerts.iter().all(|a| a.timestamp == 42));
        assert_eq!(alerts[0].kind.aircraft(), vec!["A", "UNSAFE01"]);
    }

    #[test]
    fn test_custom_landing_assessor() {
        struct NeverSafe;
        impl LandingAssessor for NeverSafe {
            fn assess(&self, _aircraft: &PositionReport, _runways: &[Runway]) -> Option<String> {
                Some("descent rate exceeds limits".to_string())
            }
        }

        let engine = AlertEngine::default().with_landing_assessor(Box::new(NeverSafe));
        let positions = vec![aircraft("SWR1", 47.0, 8.0, 1000.0), aircraft("SWR2", 48.0, 8.0, 1000.0)];

        let alerts = engine.evaluate(&positions, &[], &[], 0);
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.alert_type() == AlertType::UnsafeLandingConditions));
    }
}
