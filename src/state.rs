//! Satellite state as seen from the ground at one instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Station-relative part of a [`SatelliteState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Topocentric {
    /// Azimuth (rad, [0, 2π))
    pub azimuth: f64,
    /// Elevation (rad)
    pub elevation: f64,
    /// Slant range (km)
    pub range: f64,
    /// Range rate (km/s)
    pub range_rate: f64,
    pub above_horizon: bool,
    /// Station local sidereal angle (rad)
    pub local_sidereal_angle: f64,
}

/// Position of a satellite at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SatelliteState {
    pub time: DateTime<Utc>,
    /// Geodetic latitude (rad)
    pub latitude: f64,
    /// East longitude (rad, [0, 2π))
    pub longitude: f64,
    /// Altitude above the ellipsoid (km)
    pub altitude: f64,
    /// Orbital phase (rad)
    pub phase: f64,
    /// Right ascension of the position vector (rad)
    pub theta: f64,
    /// Angular depth in the Earth's shadow (rad), non-negative when eclipsed
    pub eclipse_depth: f64,
    pub eclipsed: bool,
    /// False if the Kepler or resonance solver stopped at its iteration cap
    pub converged: bool,
    /// Look angles, present when computed for a ground station
    pub topocentric: Option<Topocentric>,
}

impl SatelliteState {
    pub fn azimuth_deg(&self) -> Option<f64> {
        self.topocentric.map(|t| t.azimuth * RAD2DEG)
    }

    pub fn elevation_deg(&self) -> Option<f64> {
        self.topocentric.map(|t| t.elevation * RAD2DEG)
    }

    pub fn above_horizon(&self) -> bool {
        self.topocentric.is_some_and(|t| t.above_horizon)
    }

    /// Footprint boundary: 360 `[latitude, longitude]` points in degrees,
    /// one per degree of azimuth around the sub-satellite point, longitudes
    /// in [0, 360].
    pub fn range_circle(&self) -> Vec<[f64; 2]> {
        range_circle(self.latitude, self.longitude, self.altitude)
    }
}

/// Footprint boundary of a satellite at `altitude` km above (`lat`, `lon`) in radians.
pub fn range_circle(lat: f64, lon: f64, altitude: f64) -> Vec<[f64; 2]> {
    // Footprint diameter along the surface, truncated to whole km
    let diameter = (12756.33 * (XKMPER / (XKMPER + altitude)).acos()).trunc();
    let beta = 0.5 * diameter / 6378.16;
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_beta, cos_beta) = beta.sin_cos();

    (0..360)
        .map(|azi| {
            let az = f64::from(azi) / 360.0 * TAU;
            let range_lat = (sin_lat * cos_beta + az.cos() * sin_beta * cos_lat).asin();
            let num = cos_beta - sin_lat * range_lat.sin();
            let den = cos_lat * range_lat.cos();

            let mut range_lon = if (azi == 0 || azi == 180) && beta > std::f64::consts::FRAC_PI_2 - lat {
                // Footprint wraps over the pole
                lon + std::f64::consts::PI
            } else if (num / den).abs() > 1.0 {
                lon
            } else if 180 - azi >= 0 {
                lon - (num / den).acos()
            } else {
                lon + (num / den).acos()
            };

            while range_lon < 0.0 {
                range_lon += TAU;
            }
            while range_lon > TAU {
                range_lon -= TAU;
            }

            [range_lat * RAD2DEG, range_lon * RAD2DEG]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Longitude difference on the circle (degrees).
    fn lon_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    fn assert_point(p: [f64; 2], lat: f64, lon: f64) {
        assert_relative_eq!(p[0], lat, epsilon = 1.0);
        assert!(lon_diff(p[1], lon) <= 1.0, "lon {} vs {lon}", p[1]);
    }

    #[test]
    fn test_range_circle_at_origin() {
        let circle = range_circle(0.0, 0.0, 1000.0);
        assert_eq!(circle.len(), 360);
        assert_point(circle[0], 30.0, 0.0);
        assert_point(circle[89], 1.0, 330.0);
        assert_point(circle[179], -30.0, 359.0);
        assert_point(circle[269], -1.0, 30.0);
    }

    #[test]
    fn test_range_circle_offset() {
        let circle = range_circle(10.0 * DEG2RAD, 10.0 * DEG2RAD, 1000.0);
        assert_point(circle[0], 40.0, 10.0);
        assert_point(circle[89], 9.0, 339.0);
        assert_point(circle[179], -20.0, 9.0);
        assert_point(circle[269], 8.0, 41.0);
    }

    #[test]
    fn test_range_circle_longitudes_in_range() {
        let circle = range_circle(0.5648232, 6.2069835, 818.1375014);
        for [lat, lon] in circle {
            assert!((-90.0..=90.0).contains(&lat));
            assert!((0.0..=360.0).contains(&lon), "lon={lon}");
        }
    }

    #[test]
    fn test_range_circle_leo_regression() {
        let circle = range_circle(0.5648232, 6.2069835, 818.1375014);
        assert_point(circle[0], 59.9, 355.6);
        assert_point(circle[89], 28.8, 323.8);
        assert_point(circle[179], 4.8, 355.2);
        assert_point(circle[269], 27.9, 27.2);
    }
}
