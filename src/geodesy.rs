// Geodesy module - coordinate transformations and distance calculations
//
// Provides conversions between:
// - LLH (Latitude/Longitude/Height) in degrees and meters
// - ECEF (Earth-Centered Earth-Fixed) in meters
//
// The ellipsoid radius is explicit: the default keeps the mean Earth radius
// (6371 km) the alerting service has always used, WGS84 is available.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::constants::{EARTH_RADIUS_M, ECC_SQ, ECEF_REFINE_STEPS, WGS84_A};

/// Degrees to radians conversion factor
const DTOR: f64 = PI / 180.0;

/// Radians to degrees conversion factor
const RTOD: f64 = 180.0 / PI;

/// Below this |cos(lat)| the height is taken from the polar axis.
const POLAR_COS_LIMIT: f64 = 1e-9;

/// Ellipsoid used by the coordinate transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ellipsoid {
    /// Equatorial radius in meters
    pub radius: f64,
    /// Eccentricity squared
    pub ecc_sq: f64,
    /// Fixed-point refinement steps for ECEF -> LLH latitude
    pub refine_steps: usize,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::legacy()
    }
}

impl Ellipsoid {
    /// Mean Earth radius with WGS84 eccentricity. Output-compatible with the
    /// fixes produced so far.
    pub const fn legacy() -> Self {
        Ellipsoid {
            radius: EARTH_RADIUS_M,
            ecc_sq: ECC_SQ,
            refine_steps: ECEF_REFINE_STEPS,
        }
    }

    /// WGS84 semi-major axis with WGS84 eccentricity.
    pub const fn wgs84() -> Self {
        Ellipsoid {
            radius: WGS84_A,
            ecc_sq: ECC_SQ,
            refine_steps: ECEF_REFINE_STEPS,
        }
    }

    /// Radius of curvature in the prime vertical at geodetic latitude `lat_rad`
    #[inline]
    fn prime_vertical(&self, lat_rad: f64) -> f64 {
        let slat = lat_rad.sin();
        self.radius / (1.0 - self.ecc_sq * slat * slat).sqrt()
    }

    /// Converts lat/lon/height to ECEF coordinates
    ///
    /// # Arguments
    /// * `lat` - Latitude in degrees
    /// * `lon` - Longitude in degrees
    /// * `alt` - Height in meters above the ellipsoid
    ///
    /// # Returns
    /// ECEF coordinates (x, y, z) in meters
    pub fn llh2ecef(&self, lat: f64, lon: f64, alt: f64) -> (f64, f64, f64) {
        let lat_rad = lat * DTOR;
        let lon_rad = lon * DTOR;

        let slat = lat_rad.sin();
        let clat = lat_rad.cos();
        let slon = lon_rad.sin();
        let clon = lon_rad.cos();

        let rn = self.prime_vertical(lat_rad);

        let x = (rn + alt) * clat * clon;
        let y = (rn + alt) * clat * slon;
        let z = (rn * (1.0 - self.ecc_sq) + alt) * slat;

        (x, y, z)
    }

    /// Converts ECEF coordinates to lat/lon/height
    ///
    /// Latitude starts from the zero-height estimate and is refined by
    /// `refine_steps` fixed-point iterations on the prime-vertical radius.
    ///
    /// # Returns
    /// (latitude, longitude, altitude) where lat/lon are in degrees and altitude in meters
    pub fn ecef2llh(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let lon = y.atan2(x);
        let p = (x * x + y * y).sqrt();

        let mut lat = z.atan2(p * (1.0 - self.ecc_sq));
        for _ in 0..self.refine_steps {
            let n = self.prime_vertical(lat);
            lat = (z + self.ecc_sq * n * lat.sin()).atan2(p);
        }

        let n = self.prime_vertical(lat);
        let clat = lat.cos();
        let alt = if clat.abs() > POLAR_COS_LIMIT {
            p / clat - n
        } else {
            z / lat.sin() - n * (1.0 - self.ecc_sq)
        };

        (lat * RTOD, lon * RTOD, alt)
    }
}

/// Converts lat/lon/height to ECEF with the default ellipsoid
pub fn llh2ecef(lat: f64, lon: f64, alt: f64) -> (f64, f64, f64) {
    Ellipsoid::default().llh2ecef(lat, lon, alt)
}

/// Converts ECEF to lat/lon/height with the default ellipsoid
pub fn ecef2llh(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    Ellipsoid::default().ecef2llh(x, y, z)
}

/// Returns great-circle distance in meters between two lat/lon points
///
/// Haversine formula on a sphere of radius 6371 km, altitude ignored.
///
/// # Example
/// ```
/// let distance = mlat_safety::geodesy::haversine(51.5, -0.1, 48.8, 2.3); // London to Paris
/// assert!((distance - 345_000.0).abs() < 5_000.0);
/// ```
pub fn haversine(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> f64 {
    let phi0 = lat0 * DTOR;
    let phi1 = lat1 * DTOR;
    let dphi = (lat1 - lat0) * DTOR;
    let dlambda = (lon1 - lon0) * DTOR;

    let a = (dphi / 2.0).sin().powi(2) + phi0.cos() * phi1.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Returns straight-line (Euclidean) distance in meters between two ECEF points
#[inline]
pub fn ecef_distance(p0: (f64, f64, f64), p1: (f64, f64, f64)) -> f64 {
    let dx = p0.0 - p1.0;
    let dy = p0.1 - p1.1;
    let dz = p0.2 - p1.2;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Meters spanned by `meters` along a meridian, in degrees of latitude
#[inline]
pub fn meters_to_lat_degrees(meters: f64) -> f64 {
    meters / (EARTH_RADIUS_M * DTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6; // Tolerance for floating point comparisons

    #[test]
    fn test_llh2ecef_equator() {
        let (x, y, z) = llh2ecef(0.0, 0.0, 0.0);

        assert!((x - EARTH_RADIUS_M).abs() < EPSILON);
        assert!(y.abs() < EPSILON);
        assert!(z.abs() < EPSILON);
    }

    #[test]
    fn test_llh2ecef_north_pole() {
        let (x, y, z) = llh2ecef(90.0, 0.0, 0.0);

        // Polar radius of the legacy ellipsoid: R * sqrt(1 - e2)
        let polar = EARTH_RADIUS_M * (1.0 - ECC_SQ).sqrt();
        assert!(x.abs() < EPSILON);
        assert!(y.abs() < EPSILON);
        assert!((z - polar).abs() < 1e-3);
    }

    #[test]
    fn test_ecef2llh_roundtrip_grid() {
        for ellipsoid in [Ellipsoid::legacy(), Ellipsoid::wgs84()] {
            for lat_step in 0..=36 {
                let lat = -90.0 + lat_step as f64 * 5.0;
                for lon_step in 0..=24 {
                    let lon = -180.0 + lon_step as f64 * 15.0;
                    for alt in [0.0, 350.0, 12_000.0] {
                        let (x, y, z) = ellipsoid.llh2ecef(lat, lon, alt);
                        let (lat2, lon2, alt2) = ellipsoid.ecef2llh(x, y, z);

                        assert!((lat - lat2).abs() < 1e-6, "lat {} -> {}", lat, lat2);
                        assert!((alt - alt2).abs() < 1e-3, "alt {} -> {} at lat {}", alt, alt2, lat);
                        // Longitude is undefined at the poles and wraps at +/-180
                        if lat.abs() < 90.0 {
                            let dlon = (lon - lon2).abs();
                            let dlon = dlon.min((360.0 - dlon).abs());
                            assert!(dlon < 1e-6, "lon {} -> {} at lat {}", lon, lon2, lat);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_wgs84_equator() {
        let (x, _, _) = Ellipsoid::wgs84().llh2ecef(0.0, 0.0, 0.0);
        assert!((x - WGS84_A).abs() < EPSILON);
    }

    #[test]
    fn test_haversine_equator_degree() {
        let dist = haversine(0.0, 7.0, 0.0, 8.0);
        assert!((dist - EARTH_RADIUS_M * DTOR).abs() < 1e-6, "Distance: {} meters", dist);
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine(46.2196, 7.3267, 46.2196, 7.3267);
        assert!(dist.abs() < EPSILON);
    }

    #[test]
    fn test_haversine_meridian_offset() {
        let dist = haversine(47.0, 8.0, 47.0 + meters_to_lat_degrees(500.0), 8.0);
        assert!((dist - 500.0).abs() < 1e-6, "Distance: {} meters", dist);
    }

    #[test]
    fn test_ecef_distance() {
        let p0 = (4_330_000.0, 560_000.0, 4_600_000.0);
        let p1 = (4_330_300.0, 560_400.0, 4_600_000.0);
        assert!((ecef_distance(p0, p1) - 500.0).abs() < EPSILON);
    }
}
