// Detection grouping
//
// Copies of the same transmission reach several receivers within
// microseconds of each other. Grouping buckets them by aircraft and by a
// fixed time window so that each bucket is one solver input.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single reception of an aircraft transmission at one receiver
///
/// Every field may be absent in the input. An incomplete detection still
/// deserializes and is dropped by [`group`], so one bad record does not
/// reject the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    #[serde(default)]
    pub aircraft_id: String,
    #[serde(default)]
    pub receiver_id: String,
    /// Arrival time in milliseconds (sub-millisecond precision), NaN when missing
    #[serde(default = "missing_timestamp")]
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<f64>,
    /// Reported altitude hint (m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Reported ground speed hint (knots)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Planned route as [lat, lon] waypoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_runway: Option<String>,
}

fn missing_timestamp() -> f64 {
    f64::NAN
}

impl Detection {
    pub fn new(aircraft_id: impl Into<String>, receiver_id: impl Into<String>, timestamp: f64) -> Self {
        Detection {
            aircraft_id: aircraft_id.into(),
            receiver_id: receiver_id.into(),
            timestamp,
            signal: None,
            altitude: None,
            speed: None,
            route: None,
            target_runway: None,
        }
    }
}

/// Detections of one aircraft within one time window
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionGroup {
    pub aircraft_id: String,
    /// Window index: floor(timestamp / window_ms)
    pub window: i64,
    pub detections: Vec<Detection>,
}

impl DetectionGroup {
    /// Latest arrival time in the group (ms)
    pub fn last_timestamp(&self) -> f64 {
        self.detections
            .iter()
            .map(|d| d.timestamp)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Group detections by (aircraft id, floor(timestamp / window_ms))
///
/// Groups are returned in order of their first detection; detections keep
/// their input order within a group. Detections with no aircraft id or a
/// non-finite timestamp are dropped.
///
/// # Arguments
/// * `detections` - Raw detections in arrival order
/// * `window_ms` - Window length in milliseconds, must be positive
pub fn group(detections: &[Detection], window_ms: f64) -> Vec<DetectionGroup> {
    let mut index: HashMap<(&str, i64), usize> = HashMap::new();
    let mut groups: Vec<DetectionGroup> = Vec::new();

    for detection in detections {
        if detection.aircraft_id.is_empty() {
            debug!(receiver_id = %detection.receiver_id, "Dropping detection without aircraft id");
            continue;
        }
        if !detection.timestamp.is_finite() {
            debug!(aircraft_id = %detection.aircraft_id, receiver_id = %detection.receiver_id,
                "Dropping detection with invalid timestamp");
            continue;
        }

        let window = (detection.timestamp / window_ms).floor() as i64;
        let slot = *index
            .entry((detection.aircraft_id.as_str(), window))
            .or_insert_with(|| {
                groups.push(DetectionGroup {
                    aircraft_id: detection.aircraft_id.clone(),
                    window,
                    detections: Vec::new(),
                });
                groups.len() - 1
            });
        groups[slot].detections.push(detection.clone());
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_detections_dropped() {
        let detections: Vec<Detection> = serde_json::from_str(
            r#"[
                { "aircraftId": "A", "receiverId": "RX1", "timestamp": 1000.0 },
                { "aircraftId": "A", "receiverId": "RX2" },
                { "receiverId": "RX3", "timestamp": 1000.2 },
                { "aircraftId": "A", "receiverId": "RX4", "timestamp": 1000.3 }
            ]"#,
        )
        .unwrap();
        assert!(detections[1].timestamp.is_nan());
        assert!(detections[2].aircraft_id.is_empty());

        let groups = group(&detections, 1000.0);
        assert_eq!(groups.len(), 1);
        let receivers: Vec<&str> = groups[0].detections.iter().map(|d| d.receiver_id.as_str()).collect();
        assert_eq!(receivers, vec!["RX1", "RX4"]);
    }

    #[test]
    fn test_group_by_aircraft_and_window() {
        let detections = vec![
            Detection::new("UAL123", "RX001", 1000.0),
            Detection::new("DAL456", "RX001", 1000.5),
            Detection::new("UAL123", "RX002", 1999.9),
            Detection::new("UAL123", "RX003", 2000.0),
            Detection::new("DAL456", "RX002", 1001.0),
        ];

        let groups = group(&detections, 1000.0);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].aircraft_id, "UAL123");
        assert_eq!(groups[0].window, 1);
        assert_eq!(groups[0].detections.len(), 2);
        assert_eq!(groups[1].aircraft_id, "DAL456");
        assert_eq!(groups[1].detections.len(), 2);
        assert_eq!(groups[2].aircraft_id, "UAL123");
        assert_eq!(groups[2].window, 2);
    }

    #[test]
    fn test_group_is_deterministic() {
        let detections: Vec<Detection> = (0..50)
            .map(|i| Detection::new(format!("AC{}", i % 3), format!("RX{}", i % 5), 10_000.0 + i as f64 * 37.3))
            .collect();

        assert_eq!(group(&detections, 500.0), group(&detections, 500.0));
    }

    #[test]
    fn test_group_drops_invalid_timestamp() {
        let detections = vec![
            Detection::new("UAL123", "RX001", f64::NAN),
            Detection::new("UAL123", "RX002", 5.0),
        ];

        let groups = group(&detections, 1000.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].detections.len(), 1);
        assert_eq!(groups[0].last_timestamp(), 5.0);
    }

    #[test]
    fn test_detection_deserialize_camel_case() {
        let json = r#"{"aircraftId": "UAL123", "receiverId": "RX001", "timestamp": 1700000000000.125,
                       "speed": 450, "route": [[40.7, -74.0], [40.8, -73.9]], "targetRunway": "RWY01"}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.aircraft_id, "UAL123");
        assert_eq!(detection.speed, Some(450.0));
        assert_eq!(detection.route.as_ref().map(|r| r.len()), Some(2));
        assert_eq!(detection.target_runway.as_deref(), Some("RWY01"));
    }
}
