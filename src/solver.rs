// TDOA position solver using Gauss-Newton least squares
//
// The first measurement is the time reference. Every other receiver
// contributes one range-difference equation, so four receivers give the
// three equations needed for a 3D fix.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::constants::{
    MIN_DISTINCT_DISTANCE_M, MIN_RECEIVERS, SINGULAR_DETERMINANT, SOLVER_MAX_ITERATIONS, SOLVER_TOLERANCE_M, SPEED_OF_LIGHT,
};
use crate::geodesy::Ellipsoid;

/// Solver tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverConfig {
    /// Gauss-Newton iteration cap
    pub max_iterations: usize,
    /// Stop once the position update is shorter than this (m)
    pub tolerance: f64,
    /// Normal-equation determinant treated as singular
    pub singular_determinant: f64,
    /// Propagation speed (m/s)
    pub propagation_speed: f64,
    /// Receivers closer than this (m) are one station
    pub min_distinct_distance: f64,
    /// Coordinate transform used for the final LLH conversion
    pub ellipsoid: Ellipsoid,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_iterations: SOLVER_MAX_ITERATIONS,
            tolerance: SOLVER_TOLERANCE_M,
            singular_determinant: SINGULAR_DETERMINANT,
            propagation_speed: SPEED_OF_LIGHT,
            min_distinct_distance: MIN_DISTINCT_DISTANCE_M,
            ellipsoid: Ellipsoid::default(),
        }
    }
}

/// Arrival of one transmission at one receiver
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    pub receiver_position: [f64; 3], // ECEF coordinates
    pub timestamp: f64,              // Arrival time in milliseconds
}

/// Why no position could be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NoFix {
    #[error("insufficient data: {available} measurements, {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("receiver count {receivers} does not match timestamp count {timestamps}")]
    MismatchedInput { receivers: usize, timestamps: usize },

    #[error("degenerate geometry, no finite estimate")]
    Degenerate,
}

/// How the Gauss-Newton iteration ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// Update fell below tolerance
    Converged,
    /// Normal equations became singular; estimate is the last good iterate
    Singular,
    /// Iteration cap reached
    MaxIterations,
}

/// Solved position
#[derive(Debug, Clone, Copy)]
pub struct PositionFix {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub position: [f64; 3], // ECEF
    pub iterations: usize,
    pub termination: Termination,
}

/// Solve for a transmitter position from arrival times
///
/// # Arguments
/// * `measurements` - One entry per receiver; the first one is the time reference
/// * `config` - Solver tunables
///
/// # Returns
/// * `Ok(PositionFix)` with the best estimate, also when the iteration stopped on a singular system
/// * `Err(NoFix)` with fewer than 4 distinct receivers or a non-finite estimate
pub fn solve(measurements: &[Measurement], config: &SolverConfig) -> Result<PositionFix, NoFix> {
    if measurements.len() < MIN_RECEIVERS {
        return Err(NoFix::InsufficientData {
            available: measurements.len(),
            required: MIN_RECEIVERS,
        });
    }

    let positions: Vec<Vector3<f64>> = measurements
        .iter()
        .map(|m| Vector3::from(m.receiver_position))
        .collect();

    let distinct = count_distinct(&positions, config.min_distinct_distance);
    if distinct < MIN_RECEIVERS {
        return Err(NoFix::InsufficientData {
            available: distinct,
            required: MIN_RECEIVERS,
        });
    }
    let reference = positions[0];
    let reference_time = measurements[0].timestamp;

    // Range differences implied by the TDOA against the reference receiver
    let range_differences: Vec<(Vector3<f64>, f64)> = measurements[1..]
        .iter()
        .zip(&positions[1..])
        .map(|(m, p)| (*p, (m.timestamp - reference_time) / 1000.0 * config.propagation_speed))
        .collect();

    // Seed at the receiver centroid
    let mut estimate = positions.iter().fold(Vector3::zeros(), |acc, p| acc + p) / positions.len() as f64;

    let mut iterations = 0;
    let mut termination = Termination::MaxIterations;

    for iteration in 0..config.max_iterations {
        let to_reference = estimate - reference;
        let d0 = to_reference.norm();
        let u0 = to_reference / d0;

        let mut ata = Matrix3::zeros();
        let mut atb = Vector3::zeros();

        for (receiver, measured) in &range_differences {
            let to_receiver = estimate - receiver;
            let di = to_receiver.norm();
            let residual = measured - (di - d0);
            let row = to_receiver / di - u0;

            ata += row * row.transpose();
            atb += row * residual;
        }

        let delta = match solve_cramer(&ata, &atb, config.singular_determinant) {
            Some(delta) => delta,
            None => {
                debug!(iteration, "Normal equations singular, keeping best estimate");
                termination = Termination::Singular;
                break;
            }
        };

        estimate += delta;
        iterations = iteration + 1;

        if delta.norm() < config.tolerance {
            termination = Termination::Converged;
            break;
        }
    }

    if !estimate.iter().all(|v| v.is_finite()) {
        return Err(NoFix::Degenerate);
    }

    let (lat, lon, alt) = config.ellipsoid.ecef2llh(estimate.x, estimate.y, estimate.z);
    debug!(iterations, ?termination, lat, lon, alt, "TDOA solve finished");

    Ok(PositionFix {
        lat,
        lon,
        alt,
        position: [estimate.x, estimate.y, estimate.z],
        iterations,
        termination,
    })
}

/// Solve from parallel receiver (ECEF) and timestamp (ms) lists
pub fn solve_tdoa(
    receivers: &[[f64; 3]],
    timestamps: &[f64],
    config: &SolverConfig,
) -> Result<PositionFix, NoFix> {
    let available = receivers.len().min(timestamps.len());
    if available < MIN_RECEIVERS {
        return Err(NoFix::InsufficientData {
            available,
            required: MIN_RECEIVERS,
        });
    }
    if receivers.len() != timestamps.len() {
        return Err(NoFix::MismatchedInput {
            receivers: receivers.len(),
            timestamps: timestamps.len(),
        });
    }

    let measurements: Vec<Measurement> = receivers
        .iter()
        .zip(timestamps)
        .map(|(&receiver_position, &timestamp)| Measurement {
            receiver_position,
            timestamp,
        })
        .collect();
    solve(&measurements, config)
}

/// Number of receivers at least `min_distance` apart from every receiver counted before them
fn count_distinct(positions: &[Vector3<f64>], min_distance: f64) -> usize {
    let mut distinct: Vec<&Vector3<f64>> = Vec::with_capacity(positions.len());
    for p in positions {
        if distinct.iter().all(|d| (*d - p).norm() >= min_distance) {
            distinct.push(p);
        }
    }
    distinct.len()
}

/// Closed-form 3x3 solve by Cramer's rule. NaN determinants count as singular.
fn solve_cramer(a: &Matrix3<f64>, b: &Vector3<f64>, min_determinant: f64) -> Option<Vector3<f64>> {
    let det = a.determinant();
    if !(det.abs() >= min_determinant) {
        return None;
    }

    let mut x = Vector3::zeros();
    for i in 0..3 {
        let mut ai = *a;
        ai.set_column(i, b);
        x[i] = ai.determinant() / det;
    }
    Some(x)
}
