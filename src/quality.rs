// Geometry quality estimate for a solved fix
//
// A cheap stand-in for GDOP: the smallest angle between any two
// receiver-to-target lines of sight. Receivers bunched in one direction
// give a small angle and a low score.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::constants::{MIN_RECEIVERS, QUALITY_ANGLE_SCALE, QUALITY_MAX};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityConfig {
    /// Score per unit of (min angle / pi)
    pub angle_scale: f64,
    /// Score cap
    pub max_score: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        QualityConfig {
            angle_scale: QUALITY_ANGLE_SCALE,
            max_score: QUALITY_MAX,
        }
    }
}

/// Smallest pairwise angle (radians) between lines of sight from the
/// receivers to `target`. Receivers located at the target are ignored.
pub fn min_separation_angle(receivers: &[[f64; 3]], target: &[f64; 3]) -> f64 {
    let target = Vector3::from(*target);
    let lines_of_sight: Vec<Vector3<f64>> = receivers
        .iter()
        .filter_map(|r| (target - Vector3::from(*r)).try_normalize(f64::EPSILON))
        .collect();

    let mut min_angle = PI;
    for (i, a) in lines_of_sight.iter().enumerate() {
        for b in &lines_of_sight[i + 1..] {
            let angle = a.dot(b).clamp(-1.0, 1.0).acos();
            min_angle = min_angle.min(angle);
        }
    }
    min_angle
}

/// Quality score in [0, max_score] for a fix at `target` (ECEF)
///
/// Returns 0 with fewer than 4 receivers.
pub fn quality(receivers: &[[f64; 3]], target: &[f64; 3], config: &QualityConfig) -> f64 {
    if receivers.len() < MIN_RECEIVERS {
        return 0.0;
    }

    let min_angle = min_separation_angle(receivers, target);
    (min_angle / PI * config.angle_scale).min(config.max_score).round()
}
