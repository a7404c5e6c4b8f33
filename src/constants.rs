// Shared constants for position solving and alerting.
// Every tunable here is the default of a field in config::EngineConfig.

/// Speed of light in vacuum (m/s), used to turn TDOA into range differences.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Mean Earth radius (m). Used for Haversine distances and, by default,
/// as the ellipsoid radius of the coordinate transform.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 semi-major axis (m). Alternative ellipsoid radius.
pub const WGS84_A: f64 = 6_378_137.0;

/// Ellipsoid eccentricity squared.
pub const ECC_SQ: f64 = 0.00669437999014;

/// Fixed-point refinement steps for ECEF -> geodetic latitude.
pub const ECEF_REFINE_STEPS: usize = 5;

/// Minimum number of receivers for a 3D TDOA fix.
pub const MIN_RECEIVERS: usize = 4;

/// Receivers closer together than this (m) count as one station.
pub const MIN_DISTINCT_DISTANCE_M: f64 = 1.0;

/// Gauss-Newton iteration cap.
pub const SOLVER_MAX_ITERATIONS: usize = 20;

/// Gauss-Newton convergence threshold on the position update (m).
pub const SOLVER_TOLERANCE_M: f64 = 1e-6;

/// Normal-equation determinant below which the system counts as singular.
pub const SINGULAR_DETERMINANT: f64 = 1e-10;

/// Quality points per unit of (min angle / pi); 200 saturates at pi/2.
pub const QUALITY_ANGLE_SCALE: f64 = 200.0;

/// Upper bound of the quality score.
pub const QUALITY_MAX: f64 = 100.0;

/// Fixes at or below this quality are discarded.
pub const MIN_QUALITY: f64 = 30.0;

/// Detection grouping window (ms).
pub const GROUP_WINDOW_MS: f64 = 2000.0;

// --- Alert thresholds ---

/// Horizontal separation below which two aircraft are too close (m).
pub const PROXIMITY_HORIZONTAL_M: f64 = 1000.0;

/// Vertical separation below which two aircraft are too close (m).
pub const PROXIMITY_VERTICAL_M: f64 = 300.0;

/// Distance from a runway at which an aircraft counts as approaching (m).
pub const APPROACH_DISTANCE_M: f64 = 10_000.0;

/// Approach altitude ceiling (m).
pub const APPROACH_ALT_HIGH_M: f64 = 500.0;

/// Approach altitude floor (m), only applied away from the threshold.
pub const APPROACH_ALT_LOW_M: f64 = 200.0;

/// Distance from the runway beyond which the low-altitude check applies (m).
pub const APPROACH_LOW_ALT_MIN_DISTANCE_M: f64 = 2000.0;

/// Approach speed ceiling (knots).
pub const APPROACH_SPEED_HIGH_KT: f64 = 200.0;

/// Warning buffer outside a restricted zone's radius (m).
pub const RESTRICTED_ZONE_BUFFER_M: f64 = 1500.0;

/// Maximum allowed deviation from a planned route (m).
pub const PATH_DEVIATION_M: f64 = 2000.0;

/// Flat-earth scale for route projection (m per degree of latitude).
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Aircraft identifier flagged by the placeholder landing assessor.
pub const UNSAFE_LANDING_SENTINEL: &str = "UNSAFE01";
