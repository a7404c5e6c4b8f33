// Landing-safety assessment
//
// There is no real landing-safety model yet (weather, descent rate,
// glide-path angle). The rule delegates to a LandingAssessor; the default
// one only flags a configured set of aircraft identifiers.

use std::collections::HashSet;

use super::{Alert, AlertKind, Severity};
use crate::airspace::Runway;
use crate::position::PositionReport;

/// Decides whether an aircraft should not attempt to land
pub trait LandingAssessor: Send + Sync {
    /// Returns the reason the landing is unsafe, or `None` if it is not flagged
    fn assess(&self, aircraft: &PositionReport, runways: &[Runway]) -> Option<String>;
}

/// Flags aircraft by identifier
#[derive(Debug, Clone, Default)]
pub struct SentinelAssessor {
    ids: HashSet<String>,
}

impl SentinelAssessor {
    pub fn new<I: IntoIterator<Item = String>>(ids: I) -> Self {
        SentinelAssessor {
            ids: ids.into_iter().collect(),
        }
    }
}

impl LandingAssessor for SentinelAssessor {
    fn assess(&self, aircraft: &PositionReport, _runways: &[Runway]) -> Option<String> {
        self.ids
            .contains(&aircraft.aircraft_id)
            .then(|| "Weather conditions, altitude, or approach angle are unsafe.".to_string())
    }
}

/// One CRITICAL alert per aircraft the assessor flags
pub fn check_unsafe_landing(
    positions: &[PositionReport],
    runways: &[Runway],
    assessor: &dyn LandingAssessor,
    now_ms: i64,
) -> Vec<Alert> {
    positions
        .iter()
        .filter_map(|aircraft| {
            let (lat, lon, alt) = aircraft.position()?;
            let reason = assessor.assess(aircraft, runways)?;
            Some(Alert {
                message: format!(
                    "CRITICAL: Aircraft {} does not have ideal conditions to land. {}",
                    aircraft.aircraft_id, reason
                ),
                kind: AlertKind::UnsafeLandingConditions {
                    aircraft_id: aircraft.aircraft_id.clone(),
                    aircraft_position: (lat, lon, alt).into(),
                    altitude: alt.round(),
                    speed: aircraft.speed,
                    reason,
                },
                severity: Severity::Critical,
                timestamp: now_ms,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::test_support::aircraft;
    use crate::alerts::AlertType;

    #[test]
    fn test_sentinel_only() {
        let assessor = SentinelAssessor::new(["UNSAFE01".to_string()]);
        let positions = vec![
            aircraft("UAL123", 40.7, -74.0, 900.0),
            aircraft("UNSAFE01", 40.8, -74.0, 450.4),
        ];

        let alerts = check_unsafe_landing(&positions, &[], &assessor, 7);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type(), AlertType::UnsafeLandingConditions);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].kind.aircraft(), vec!["UNSAFE01"]);
        assert_eq!(
            alerts[0].message,
            "CRITICAL: Aircraft UNSAFE01 does not have ideal conditions to land. \
             Weather conditions, altitude, or approach angle are unsafe."
        );
        match &alerts[0].kind {
            AlertKind::UnsafeLandingConditions { altitude, .. } => assert_eq!(*altitude, 450.0),
            other => panic!("unexpected alert {:?}", other),
        }
    }

    #[test]
    fn test_empty_assessor_never_fires() {
        let assessor = SentinelAssessor::default();
        let positions = vec![aircraft("UNSAFE01", 40.8, -74.0, 450.0)];
        assert!(check_unsafe_landing(&positions, &[], &assessor, 7).is_empty());
    }
}
