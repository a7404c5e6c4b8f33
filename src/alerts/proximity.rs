// Aircraft-to-aircraft proximity

use tracing::debug;

use super::{Alert, AlertConfig, AlertKind, Severity};
use crate::geodesy::haversine;
use crate::position::PositionReport;

/// One CRITICAL alert for every pair closer than both the horizontal
/// and the vertical separation minimum.
pub fn check_proximity(positions: &[PositionReport], config: &AlertConfig, now_ms: i64) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for (i, first) in positions.iter().enumerate() {
        let Some(p1) = first.position() else {
            debug!(aircraft_id = %first.aircraft_id, "Skipping aircraft without position");
            continue;
        };

        for second in &positions[i + 1..] {
            let Some(p2) = second.position() else {
                continue;
            };

            let horizontal = haversine(p1.0, p1.1, p2.0, p2.1);
            let vertical = (p1.2 - p2.2).abs();

            if horizontal < config.proximity_horizontal_m && vertical < config.proximity_vertical_m {
                let distance = horizontal.round();
                let vertical_separation = vertical.round();
                alerts.push(Alert {
                    message: format!(
                        "Aircraft {} and {} are dangerously close: {}m horizontal, {}m vertical separation",
                        first.aircraft_id, second.aircraft_id, distance, vertical_separation
                    ),
                    kind: AlertKind::ProximityAlert {
                        aircraft1: first.aircraft_id.clone(),
                        aircraft2: second.aircraft_id.clone(),
                        distance,
                        vertical_separation,
                        position1: p1.into(),
                        position2: p2.into(),
                    },
                    severity: Severity::Critical,
                    timestamp: now_ms,
                });
            }
        }
    }

    alerts
}
