// Synthetic detections for demos and tests
//
// Arrival times are exact propagation delays from a known target, so a
// solve over them should return the target.

use rand::Rng;

use crate::airspace::{RestrictedZone, Runway};
use crate::constants::SPEED_OF_LIGHT;
use crate::engine::Scenario;
use crate::geodesy::{self, Ellipsoid};
use crate::grouping::Detection;
use crate::receiver::ReceiverStation;

/// One detection per station for a transmission at `target` (lat, lon, alt)
/// sent at `emit_ms`. Stations without coordinates are skipped.
pub fn detections_for(
    aircraft_id: &str,
    target: (f64, f64, f64),
    stations: &[ReceiverStation],
    emit_ms: f64,
) -> Vec<Detection> {
    let ellipsoid = Ellipsoid::default();
    let target_ecef = ellipsoid.llh2ecef(target.0, target.1, target.2);

    stations
        .iter()
        .filter_map(|station| {
            let [lat, lon, alt] = station.position_llh()?;
            let receiver = ellipsoid.llh2ecef(lat, lon, alt);
            let delay_ms = geodesy::ecef_distance(receiver, target_ecef) / SPEED_OF_LIGHT * 1000.0;
            let mut detection = Detection::new(aircraft_id, station.id.clone(), emit_ms + delay_ms);
            detection.altitude = Some(target.2);
            Some(detection)
        })
        .collect()
}

/// Add uniform timing noise in [0, max_ms) to every detection
pub fn jitter<R: Rng>(detections: &mut [Detection], max_ms: f64, rng: &mut R) {
    if max_ms <= 0.0 {
        return;
    }
    for detection in detections {
        detection.timestamp += rng.gen_range(0.0..max_ms);
    }
}

/// A small self-contained scenario around Sion (LSGS): five receivers on a
/// 35 km ring at mixed terrain heights, one runway, two restricted zones,
/// and four aircraft exercising the alert rules.
pub fn demo_scenario(emit_ms: f64) -> Scenario {
    let receivers = vec![
        ReceiverStation::new("RX001", 46.5300, 7.4090, 600.0),
        ReceiverStation::new("RX002", 46.2638, 7.7805, 2800.0),
        ReceiverStation::new("RX003", 45.9371, 7.5294, 1500.0),
        ReceiverStation::new("RX004", 46.0013, 7.0028, 3100.0),
        ReceiverStation::new("RX005", 46.3678, 6.9283, 900.0),
    ];

    let runways = vec![Runway {
        id: "RWY01".to_string(),
        number: Some("07/25".to_string()),
        name: "Sion 07/25".to_string(),
        lat: Some(46.2196),
        lon: Some(7.3267),
        heading: Some(70.0),
        length: Some(2000.0),
    }];

    let restricted_zones = vec![
        RestrictedZone {
            id: "RZ001".to_string(),
            name: "Dam Exclusion".to_string(),
            lat: Some(46.0800),
            lon: Some(7.4000),
            radius: Some(2500.0),
            zone_type: "sensitive".to_string(),
        },
        RestrictedZone {
            id: "RZ002".to_string(),
            name: "Military Range".to_string(),
            lat: Some(46.2900),
            lon: Some(7.2000),
            radius: Some(3000.0),
            zone_type: "military".to_string(),
        },
    ];

    let mut detections = Vec::new();

    // Fast and high on approach
    let mut approach = detections_for("SWR101", (46.2400, 7.2700, 900.0), &receivers, emit_ms);
    for d in &mut approach {
        d.speed = Some(230.0);
    }
    detections.extend(approach);

    // Two aircraft in conflict
    detections.extend(detections_for("EZY202", (46.1800, 7.4200, 2200.0), &receivers, emit_ms + 100.0));
    detections.extend(detections_for("BAW303", (46.1840, 7.4230, 2300.0), &receivers, emit_ms + 150.0));

    // Off its planned route, inside the military range
    let mut deviating = detections_for("UNSAFE01", (46.2900, 7.2100, 1500.0), &receivers, emit_ms + 200.0);
    for d in &mut deviating {
        d.speed = Some(150.0);
        d.route = Some(vec![[46.2000, 7.1000], [46.2200, 7.3000]]);
        d.target_runway = Some("Sion 07/25".to_string());
    }
    detections.extend(deviating);

    Scenario {
        receivers,
        detections,
        runways,
        restricted_zones,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_detections_for_delay() {
        let stations = vec![
            ReceiverStation::new("RX1", 47.0, 8.0, 0.0),
            ReceiverStation::new("RX2", 47.0, 8.1, 0.0),
        ];
        let detections = detections_for("A", (47.0, 8.0, 3000.0), &stations, 500.0);

        assert_eq!(detections.len(), 2);
        // Straight up 3 km
        let expected = 500.0 + 3000.0 / SPEED_OF_LIGHT * 1000.0;
        assert!((detections[0].timestamp - expected).abs() < 1e-9);
        assert!(detections[1].timestamp > detections[0].timestamp);
    }

    #[test]
    fn test_detections_skip_malformed_station() {
        let mut broken = ReceiverStation::new("RX2", 47.0, 8.1, 0.0);
        broken.lat = None;
        let stations = vec![ReceiverStation::new("RX1", 47.0, 8.0, 0.0), broken];

        let detections = detections_for("A", (47.0, 8.0, 3000.0), &stations, 0.0);
        assert_eq!(detections.len(), 1);
    }

    #[test]
    fn test_jitter_bounds() {
        let stations = vec![ReceiverStation::new("RX1", 47.0, 8.0, 0.0)];
        let mut detections = detections_for("A", (47.0, 8.0, 3000.0), &stations, 0.0);
        let before = detections[0].timestamp;

        let mut rng = StdRng::seed_from_u64(7);
        jitter(&mut detections, 0.5, &mut rng);

        let shift = detections[0].timestamp - before;
        assert!((0.0..0.5).contains(&shift));
    }

    #[test]
    fn test_demo_scenario_shape() {
        let scenario = demo_scenario(1000.0);
        assert_eq!(scenario.receivers.len(), 5);
        assert_eq!(scenario.detections.len(), 20);
        assert_eq!(scenario.runways.len(), 1);
        assert_eq!(scenario.restricted_zones.len(), 2);
    }
}
