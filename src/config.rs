use std::path::Path;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::alerts::AlertConfig;
use crate::constants::GROUP_WINDOW_MS;
use crate::errors::{config_error, Result};
use crate::position::ResolveConfig;
use crate::quality::QualityConfig;
use crate::solver::SolverConfig;

/// MLAT position and safety alert engine
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Scenario JSON with receivers, messages, runways and restrictedZones.
    /// Runs the built-in demo scenario when omitted.
    #[arg(long, short, value_name = "FILE")]
    pub input: Option<String>,

    /// Engine tunables as JSON; missing fields keep their defaults.
    #[arg(long, value_name = "FILE")]
    pub params: Option<String>,

    /// Detection grouping window in milliseconds.
    #[arg(long, value_name = "MS")]
    pub window_ms: Option<f64>,

    /// Discard fixes at or below this quality score.
    #[arg(long, value_name = "SCORE")]
    pub min_quality: Option<f64>,

    /// Evaluation time in milliseconds since the epoch (defaults to now).
    #[arg(long, value_name = "MS")]
    pub now_ms: Option<i64>,

    /// Write position and alert reports as JSON lines to a file instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub write_json: Option<String>,

    /// Write positions in CSV format to a local file.
    #[arg(long, value_name = "FILE")]
    pub write_csv: Vec<String>,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

/// Detection grouping tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupingConfig {
    pub window_ms: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        GroupingConfig { window_ms: GROUP_WINDOW_MS }
    }
}

/// Every tunable of one evaluation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub solver: SolverConfig,
    pub quality: QualityConfig,
    pub grouping: GroupingConfig,
    pub resolve: ResolveConfig,
    pub alerts: AlertConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Apply command-line overrides on top of loaded or default values
    pub fn with_overrides(mut self, cli: &Config) -> Result<Self> {
        if let Some(window_ms) = cli.window_ms {
            self.grouping.window_ms = window_ms;
        }
        if let Some(min_quality) = cli.min_quality {
            self.resolve.min_quality = min_quality;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.grouping.window_ms > 0.0 && self.grouping.window_ms.is_finite()) {
            return Err(config_error(format!("window must be positive, got {}", self.grouping.window_ms)));
        }
        if self.solver.max_iterations == 0 {
            return Err(config_error("solver needs at least one iteration"));
        }
        if !(self.solver.propagation_speed > 0.0) {
            return Err(config_error("propagation speed must be positive"));
        }
        if !(self.alerts.meters_per_degree > 0.0) {
            return Err(config_error("metersPerDegree must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MlatSafetyError;
    use crate::geodesy::Ellipsoid;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.grouping.window_ms, 2000.0);
        assert_eq!(config.resolve.min_quality, 30.0);
        assert_eq!(config.solver.max_iterations, 20);
        assert_eq!(config.solver.ellipsoid, Ellipsoid::legacy());
        assert_eq!(config.alerts.path_deviation_m, 2000.0);
        assert_eq!(config.alerts.unsafe_landing_ids, vec!["UNSAFE01".to_string()]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{
                "grouping": { "windowMs": 500 },
                "solver": { "ellipsoid": { "radius": 6378137.0 } },
                "alerts": { "restrictedZoneBufferM": 1000, "unsafeLandingIds": [] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.grouping.window_ms, 500.0);
        assert_eq!(config.solver.ellipsoid, Ellipsoid::wgs84());
        assert_eq!(config.solver.tolerance, 1e-6);
        assert_eq!(config.alerts.restricted_zone_buffer_m, 1000.0);
        assert_eq!(config.alerts.proximity_horizontal_m, 1000.0);
        assert!(config.alerts.unsafe_landing_ids.is_empty());
    }

    #[test]
    fn test_rejects_non_positive_window() {
        let err = EngineConfig::from_json(r#"{ "grouping": { "windowMs": 0 } }"#).unwrap_err();
        assert!(matches!(err, MlatSafetyError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, MlatSafetyError::JsonError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "resolve": {{ "minQuality": 10 }} }}"#).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.resolve.min_quality, 10.0);
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/params.json").unwrap_err();
        assert!(matches!(err, MlatSafetyError::IoError(_)));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Config::parse_from(["mlat-safety", "--window-ms", "1000", "--min-quality", "50", "-v"]);
        assert!(cli.verbose);

        let config = EngineConfig::default().with_overrides(&cli).unwrap();
        assert_eq!(config.grouping.window_ms, 1000.0);
        assert_eq!(config.resolve.min_quality, 50.0);

        let bad = Config::parse_from(["mlat-safety", "--window-ms=-5"]);
        assert!(EngineConfig::default().with_overrides(&bad).is_err());
    }
}
