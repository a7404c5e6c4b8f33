// Restricted airspace violations and proximity warnings

use tracing::debug;

use super::{Alert, AlertConfig, AlertKind, Severity, ZoneCircle};
use crate::airspace::RestrictedZone;
use crate::geodesy::haversine;
use crate::position::PositionReport;

/// Inside a zone radius: CRITICAL violation. Within the warning buffer
/// outside it: WARNING with the distance to the edge.
pub fn check_restricted_airspace(
    positions: &[PositionReport],
    zones: &[RestrictedZone],
    config: &AlertConfig,
    now_ms: i64,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for aircraft in positions {
        let Some((lat, lon, alt)) = aircraft.position() else {
            continue;
        };

        for zone in zones {
            let Some((zone_lat, zone_lon, radius)) = zone.circle() else {
                debug!(zone_id = %zone.id, "Skipping restricted zone without centre or radius");
                continue;
            };

            let distance = haversine(lat, lon, zone_lat, zone_lon);
            let zone_position = ZoneCircle { lat: zone_lat, lon: zone_lon, radius };

            if distance < radius {
                alerts.push(Alert {
                    message: format!(
                        "VIOLATION: Aircraft {} has entered restricted airspace: {} ({})",
                        aircraft.aircraft_id, zone.label(), zone.zone_type
                    ),
                    kind: AlertKind::RestrictedAirspaceViolation {
                        aircraft_id: aircraft.aircraft_id.clone(),
                        zone: zone.label().to_string(),
                        zone_type: zone.zone_type.clone(),
                        zone_position,
                        aircraft_position: (lat, lon, alt).into(),
                        distance_from_center: distance.round(),
                    },
                    severity: Severity::Critical,
                    timestamp: now_ms,
                });
            } else if distance < radius + config.restricted_zone_buffer_m {
                let distance_to_edge = (distance - radius).round();
                alerts.push(Alert {
                    message: format!(
                        "WARNING: Aircraft {} approaching restricted airspace: {} - {}m from boundary",
                        aircraft.aircraft_id, zone.label(), distance_to_edge
                    ),
                    kind: AlertKind::RestrictedAirspaceProximity {
                        aircraft_id: aircraft.aircraft_id.clone(),
                        zone: zone.label().to_string(),
                        zone_type: zone.zone_type.clone(),
                        zone_position,
                        aircraft_position: (lat, lon, alt).into(),
                        distance_from_center: distance.round(),
                        distance_to_edge,
                    },
                    severity: Severity::Warning,
                    timestamp: now_ms,
                });
            }
        }
    }

    alerts
}
