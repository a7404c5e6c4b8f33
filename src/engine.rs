// Evaluation pass: detections in, position and alert reports out
//
// group -> resolve -> latest snapshot -> alert rules -> reports

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::airspace::{RestrictedZone, Runway};
use crate::alerts::{AlertEngine, LandingAssessor};
use crate::config::EngineConfig;
use crate::errors::Result;
use crate::grouping::{self, Detection};
use crate::position::{self, PositionReport};
use crate::receiver::{ReceiverSet, ReceiverStation};
use crate::report::{AlertReport, ReportGenerator};

/// Everything one pass needs. Matches the sample-data layout, so the
/// detection list may also be called `messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub receivers: Vec<ReceiverStation>,
    #[serde(alias = "messages", default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub runways: Vec<Runway>,
    #[serde(default)]
    pub restricted_zones: Vec<RestrictedZone>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Result of one pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineOutput {
    /// Latest report per aircraft
    pub positions: Vec<PositionReport>,
    pub alerts: Vec<AlertReport>,
}

/// Position and safety-alert engine
///
/// Holds no per-pass state apart from the report id sequence, so one
/// instance can be shared behind an `Arc`.
pub struct Engine {
    config: EngineConfig,
    alerts: AlertEngine,
    reports: ReportGenerator,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let alerts = AlertEngine::new(config.alerts.clone());
        Engine {
            config,
            alerts,
            reports: ReportGenerator::new(),
        }
    }

    /// Replace the landing-safety capability
    pub fn with_landing_assessor(mut self, landing: Box<dyn LandingAssessor>) -> Self {
        self.alerts = self.alerts.with_landing_assessor(landing);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Position reports for every detection group that resolves,
    /// in group order (one aircraft may appear once per window)
    pub fn positions(&self, receivers: &[ReceiverStation], detections: &[Detection]) -> Vec<PositionReport> {
        let receivers = ReceiverSet::new(receivers, &self.config.solver.ellipsoid);
        let groups = grouping::group(detections, self.config.grouping.window_ms);
        position::resolve_all(
            &groups,
            &receivers,
            &self.config.solver,
            &self.config.quality,
            &self.config.resolve,
        )
    }

    /// Run one pass. `now_ms` stamps every alert.
    pub fn evaluate(&self, scenario: &Scenario, now_ms: i64) -> EngineOutput {
        let reports = self.positions(&scenario.receivers, &scenario.detections);
        let positions = position::latest_snapshot(&reports);

        let alerts = self
            .alerts
            .evaluate(&positions, &scenario.runways, &scenario.restricted_zones, now_ms);
        let alerts = self.reports.generate_all(alerts);

        info!(
            detections = scenario.detections.len(),
            fixes = reports.len(),
            aircraft = positions.len(),
            alerts = alerts.len(),
            "Evaluation complete"
        );

        EngineOutput { positions, alerts }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(EngineConfig::default())
    }
}
