// Unstable approach detection

use tracing::debug;

use super::{Alert, AlertConfig, AlertKind, LatLon, Severity};
use crate::airspace::Runway;
use crate::geodesy::haversine;
use crate::position::PositionReport;

/// Issues with an aircraft `distance` meters from a runway
fn approach_issues(alt: f64, speed: f64, distance: f64, config: &AlertConfig) -> Vec<String> {
    let mut issues = Vec::new();

    if alt > config.approach_alt_high_m {
        issues.push(format!("altitude too high ({}m)", alt.round()));
    } else if alt < config.approach_alt_low_m && distance > config.approach_low_alt_min_distance_m {
        issues.push(format!("altitude too low ({}m)", alt.round()));
    }

    if speed > config.approach_speed_high_kt {
        issues.push(format!("speed too high ({} knots)", speed));
    }

    issues
}

/// One WARNING per (aircraft, runway) pair inside the approach distance
/// with at least one altitude or speed issue. Missing speed counts as 0.
pub fn check_unstable_approach(
    positions: &[PositionReport],
    runways: &[Runway],
    config: &AlertConfig,
    now_ms: i64,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for aircraft in positions {
        let Some((lat, lon, alt)) = aircraft.position() else {
            continue;
        };
        let speed = aircraft.speed.filter(|s| s.is_finite()).unwrap_or(0.0);

        for runway in runways {
            let Some((runway_lat, runway_lon)) = runway.position() else {
                debug!(runway_id = %runway.id, "Skipping runway without coordinates");
                continue;
            };

            let distance = haversine(lat, lon, runway_lat, runway_lon);
            if distance >= config.approach_distance_m {
                continue;
            }

            let issues = approach_issues(alt, speed, distance, config);
            if issues.is_empty() {
                continue;
            }

            alerts.push(Alert {
                message: format!(
                    "Unstable approach detected for {} to {}: {}",
                    aircraft.aircraft_id,
                    runway.label(),
                    issues.join(", ")
                ),
                kind: AlertKind::UnstableApproach {
                    aircraft_id: aircraft.aircraft_id.clone(),
                    runway: runway.label().to_string(),
                    runway_position: LatLon { lat: runway_lat, lon: runway_lon },
                    aircraft_position: (lat, lon, alt).into(),
                    distance_to_runway: distance.round(),
                    altitude: alt.round(),
                    speed,
                    issues,
                },
                severity: Severity::Warning,
                timestamp: now_ms,
            });
        }
    }

    alerts
}
