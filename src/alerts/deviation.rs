// Planned-route deviation
//
// Uses a flat-earth projection around the aircraft's current latitude.
// Only valid over short routes; the 2000 m threshold is calibrated for it.

use super::{Alert, AlertConfig, AlertKind, Severity};
use crate::position::PositionReport;

/// Distance from point `p` to segment `a`-`b` in projected meters.
/// A zero-length segment measures to `a`.
fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;

    let (cx, cy) = if len_sq == 0.0 {
        a
    } else {
        let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
        (a.0 + t * dx, a.1 + t * dy)
    };

    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// Minimum distance from the aircraft to the route and the index of the
/// closest segment. `None` when no segment has finite endpoints.
pub fn route_deviation(lat: f64, lon: f64, route: &[[f64; 2]], meters_per_degree: f64) -> Option<(f64, usize)> {
    let lat_scale = meters_per_degree;
    let lon_scale = meters_per_degree * lat.to_radians().cos();
    let project = |[la, lo]: [f64; 2]| (la * lat_scale, lo * lon_scale);
    let here = project([lat, lon]);

    let mut best: Option<(f64, usize)> = None;
    for (i, pair) in route.windows(2).enumerate() {
        if !pair.iter().flatten().all(|v| v.is_finite()) {
            continue;
        }
        let d = distance_to_segment(here, project(pair[0]), project(pair[1]));
        if best.map_or(true, |(min, _)| d < min) {
            best = Some((d, i));
        }
    }
    best
}

/// One WARNING per aircraft whose closest route segment is farther than
/// the deviation threshold. Aircraft without a route of two or more
/// waypoints are ignored.
pub fn check_path_deviation(positions: &[PositionReport], config: &AlertConfig, now_ms: i64) -> Vec<Alert> {
    positions
        .iter()
        .filter_map(|aircraft| {
            let route = aircraft.route.as_ref().filter(|r| r.len() >= 2)?;
            let (lat, lon, alt) = aircraft.position()?;
            let (min_deviation, closest_segment) = route_deviation(lat, lon, route, config.meters_per_degree)?;
            if min_deviation <= config.path_deviation_m {
                return None;
            }

            let deviation = min_deviation.round();
            Some(Alert {
                message: format!(
                    "PATH DEVIATION: Aircraft {} has deviated {}m from planned route to {}",
                    aircraft.aircraft_id,
                    deviation,
                    aircraft.target_runway.as_deref().unwrap_or("unknown runway")
                ),
                kind: AlertKind::PathDeviation {
                    aircraft_id: aircraft.aircraft_id.clone(),
                    deviation,
                    planned_route: route.clone(),
                    current_position: (lat, lon, alt).into(),
                    closest_segment,
                    target_runway: aircraft.target_runway.clone(),
                },
                severity: Severity::Warning,
                timestamp: now_ms,
            })
        })
        .collect()
}
