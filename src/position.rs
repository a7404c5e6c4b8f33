// Position resolution: detection groups -> position reports

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{MIN_QUALITY, MIN_RECEIVERS};
use crate::grouping::DetectionGroup;
use crate::quality::{self, QualityConfig};
use crate::receiver::ReceiverSet;
use crate::solver::{self, Measurement, NoFix, SolverConfig};

/// A solved aircraft position, the unit the alert rules work on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionReport {
    pub aircraft_id: String,
    pub lat: f64,
    pub lon: f64,
    /// Meters
    pub alt: f64,
    /// Geometry quality, 0..=100
    pub quality: f64,
    pub num_receivers: usize,
    /// Milliseconds
    pub timestamp: f64,
    #[serde(default)]
    pub receivers: Vec<String>,
    /// Knots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_runway: Option<String>,
}

impl PositionReport {
    /// (lat, lon, alt) if all three are finite
    pub fn position(&self) -> Option<(f64, f64, f64)> {
        if self.lat.is_finite() && self.lon.is_finite() && self.alt.is_finite() {
            Some((self.lat, self.lon, self.alt))
        } else {
            None
        }
    }
}

/// Position resolution tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveConfig {
    /// Fixes at or below this quality are dropped
    pub min_quality: f64,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        ResolveConfig { min_quality: MIN_QUALITY }
    }
}

/// Resolve one detection group into a position report
///
/// Detections from unknown receivers are skipped, and a receiver that
/// reports the same transmission twice contributes only its earliest
/// arrival. Returns `None` when fewer
/// than 4 usable detections remain, the solver finds no fix, or the fix
/// quality does not exceed `resolve.min_quality`.
pub fn resolve(
    group: &DetectionGroup,
    receivers: &ReceiverSet,
    solver_config: &SolverConfig,
    quality_config: &QualityConfig,
    resolve: &ResolveConfig,
) -> Option<PositionReport> {
    let aircraft_id = group.aircraft_id.as_str();
    if group.detections.len() < MIN_RECEIVERS {
        debug!(aircraft_id, copies = group.detections.len(), "Group too small to resolve");
        return None;
    }

    // One measurement per receiver: the earliest arrival wins, order of first appearance kept
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut measurements: Vec<Measurement> = Vec::with_capacity(group.detections.len());
    let mut receiver_ids: Vec<String> = Vec::with_capacity(group.detections.len());
    for detection in &group.detections {
        let Some(receiver) = receivers.get(&detection.receiver_id) else {
            debug!(aircraft_id, receiver_id = %detection.receiver_id, "Unknown receiver, skipping detection");
            continue;
        };
        match slots.get(receiver.id.as_str()) {
            Some(&slot) => {
                debug!(aircraft_id, receiver_id = %receiver.id, "Repeated receiver in group, keeping earliest");
                if detection.timestamp < measurements[slot].timestamp {
                    measurements[slot].timestamp = detection.timestamp;
                }
            }
            None => {
                slots.insert(receiver.id.as_str(), measurements.len());
                measurements.push(Measurement {
                    receiver_position: receiver.position,
                    timestamp: detection.timestamp,
                });
                receiver_ids.push(receiver.id.clone());
            }
        }
    }

    let fix = match solver::solve(&measurements, solver_config) {
        Ok(fix) => fix,
        Err(NoFix::InsufficientData { available, .. }) => {
            debug!(aircraft_id, available, "Not enough known receivers for a fix");
            return None;
        }
        Err(e) => {
            warn!(aircraft_id, error = %e, "No fix");
            return None;
        }
    };

    let positions: Vec<[f64; 3]> = measurements.iter().map(|m| m.receiver_position).collect();
    let score = quality::quality(&positions, &fix.position, quality_config);
    if score <= resolve.min_quality {
        debug!(aircraft_id, quality = score, "Fix quality too low, discarding");
        return None;
    }

    // Hints ride along on the detections; the first one carrying each wins
    let speed = group.detections.iter().find_map(|d| d.speed);
    let route = group.detections.iter().find_map(|d| d.route.clone());
    let target_runway = group.detections.iter().find_map(|d| d.target_runway.clone());

    Some(PositionReport {
        aircraft_id: group.aircraft_id.clone(),
        lat: fix.lat,
        lon: fix.lon,
        alt: fix.alt,
        quality: score,
        num_receivers: measurements.len(),
        timestamp: group.last_timestamp(),
        receivers: receiver_ids,
        speed,
        route,
        target_runway,
    })
}

/// Resolve every group, keeping the groups that produced a report
pub fn resolve_all(
    groups: &[DetectionGroup],
    receivers: &ReceiverSet,
    solver_config: &SolverConfig,
    quality_config: &QualityConfig,
    resolve_config: &ResolveConfig,
) -> Vec<PositionReport> {
    groups
        .iter()
        .filter_map(|g| resolve(g, receivers, solver_config, quality_config, resolve_config))
        .collect()
}

/// Latest report per aircraft, ordered by first appearance.
/// A later timestamp wins; on a tie the later entry wins.
pub fn latest_snapshot(reports: &[PositionReport]) -> Vec<PositionReport> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<&PositionReport> = Vec::new();

    for report in reports {
        match index.get(report.aircraft_id.as_str()) {
            Some(&slot) => {
                if report.timestamp >= latest[slot].timestamp {
                    latest[slot] = report;
                }
            }
            None => {
                index.insert(report.aircraft_id.as_str(), latest.len());
                latest.push(report);
            }
        }
    }

    latest.into_iter().cloned().collect()
}
