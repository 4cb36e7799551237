//! Ground station location and local horizon.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::PredictError;
use crate::time::{fmod2p, theta_g_jd};

/// Number of 10° azimuth sectors in a horizon mask.
pub const HORIZON_SECTORS: usize = 36;

/// Minimum elevation (degrees) per 10° azimuth sector, sector 0 covering
/// azimuth [0°, 10°).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct HorizonMask([f64; HORIZON_SECTORS]);

impl HorizonMask {
    pub fn new(elevations: &[f64]) -> Result<Self, PredictError> {
        let sectors: [f64; HORIZON_SECTORS] = elevations
            .try_into()
            .map_err(|_| PredictError::InvalidHorizonMask(elevations.len()))?;
        if let Some(bad) = sectors.iter().find(|e| !e.is_finite()) {
            return Err(PredictError::invalid("horizon_mask", *bad, "must be finite"));
        }
        Ok(HorizonMask(sectors))
    }

    /// Mask elevation (degrees) for an azimuth in degrees.
    pub fn elevation_at(&self, azimuth_deg: f64) -> f64 {
        let sector = (azimuth_deg.max(0.0) / 10.0) as usize;
        self.0[sector.min(HORIZON_SECTORS - 1)]
    }

    pub fn sectors(&self) -> &[f64; HORIZON_SECTORS] {
        &self.0
    }
}

impl Default for HorizonMask {
    fn default() -> Self {
        HorizonMask([0.0; HORIZON_SECTORS])
    }
}

impl TryFrom<Vec<f64>> for HorizonMask {
    type Error = PredictError;

    fn try_from(v: Vec<f64>) -> Result<Self, Self::Error> {
        HorizonMask::new(&v)
    }
}

impl From<HorizonMask> for Vec<f64> {
    fn from(mask: HorizonMask) -> Self {
        mask.0.to_vec()
    }
}

/// Observer on the WGS-84 ellipsoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundStation {
    /// Geodetic latitude (degrees, north positive)
    pub latitude: f64,
    /// Longitude (degrees, east positive)
    pub longitude: f64,
    /// Height above mean sea level (m)
    pub altitude: f64,
    #[serde(default)]
    pub horizon: HorizonMask,
}

impl GroundStation {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        GroundStation {
            latitude,
            longitude,
            altitude,
            horizon: HorizonMask::default(),
        }
    }

    /// Replace the flat horizon with 36 per-sector minimum elevations.
    pub fn with_horizon_mask(mut self, elevations: &[f64]) -> Result<Self, PredictError> {
        self.horizon = HorizonMask::new(elevations)?;
        Ok(self)
    }

    /// Minimum visible elevation (degrees) toward an azimuth in radians.
    pub fn horizon_elevation(&self, azimuth: f64) -> f64 {
        self.horizon.elevation_at(azimuth * RAD2DEG)
    }

    /// Local sidereal angle (rad) at a Julian date.
    pub fn sidereal_angle(&self, jd: f64) -> f64 {
        fmod2p(theta_g_jd(jd) + self.longitude * DEG2RAD)
    }

    /// Inertial position (km), velocity (km/s) and local sidereal angle (rad)
    /// of the station at a Julian date.
    pub fn position_velocity(&self, jd: f64) -> ([f64; 3], [f64; 3], f64) {
        let lat = self.latitude * DEG2RAD;
        let theta = self.sidereal_angle(jd);
        let sin_lat = lat.sin();
        let c = 1.0 / (1.0 + FLATTENING * (FLATTENING - 2.0) * sin_lat * sin_lat).sqrt();
        let sq = (1.0 - FLATTENING) * (1.0 - FLATTENING) * c;
        let height_km = self.altitude / 1000.0;
        let achcp = (XKMPER * c + height_km) * lat.cos();

        let position = [
            achcp * theta.cos(),
            achcp * theta.sin(),
            (XKMPER * sq + height_km) * sin_lat,
        ];
        let velocity = [-MFACTOR * position[1], MFACTOR * position[0], 0.0];
        (position, velocity, theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_construction() {
        let gs = GroundStation::new(1.0, 2.0, 3.0);
        assert_eq!(gs.latitude, 1.0);
        assert_eq!(gs.longitude, 2.0);
        assert_eq!(gs.altitude, 3.0);
        assert_eq!(gs.horizon_elevation(2.0), 0.0);
    }

    #[test]
    fn test_horizon_mask_sectors() {
        let elevations: Vec<f64> = (0..36).map(|i| (i % 10) as f64).collect();
        let gs = GroundStation::new(52.0, -2.0, 200.0)
            .with_horizon_mask(&elevations)
            .unwrap();
        assert_eq!(gs.horizon.sectors().as_slice(), elevations.as_slice());
        assert_eq!(gs.horizon_elevation(0.0), 0.0);
        assert_eq!(gs.horizon_elevation(15.0 * DEG2RAD), 1.0);
        assert_eq!(gs.horizon_elevation(99.9 * DEG2RAD), 9.0);
        assert_eq!(gs.horizon_elevation(100.5 * DEG2RAD), 0.0);
        // A full turn folds into the last sector
        assert_eq!(gs.horizon_elevation(TAU), 5.0);
        assert_eq!(gs.horizon.elevation_at(100.0), 0.0);
    }

    #[test]
    fn test_wrong_mask_length_is_rejected() {
        let err = GroundStation::new(0.0, 0.0, 0.0)
            .with_horizon_mask(&[0.0; 35])
            .unwrap_err();
        assert_eq!(err, PredictError::InvalidHorizonMask(35));
        assert!(GroundStation::new(0.0, 0.0, 0.0).with_horizon_mask(&[0.0; 37]).is_err());
    }

    #[test]
    fn test_mask_serde_requires_36_entries() {
        let ok: Result<HorizonMask, _> = HorizonMask::try_from(vec![1.0; 36]);
        assert!(ok.is_ok());
        let short: Result<HorizonMask, _> = HorizonMask::try_from(vec![1.0; 12]);
        assert!(short.is_err());
        let back: Vec<f64> = ok.unwrap().into();
        assert_eq!(back.len(), 36);
    }

    #[test]
    fn test_equator_position_radius() {
        let gs = GroundStation::new(0.0, 0.0, 0.0);
        let (pos, vel, theta) = gs.position_velocity(2_451_545.0);
        assert_relative_eq!(theta, gs.sidereal_angle(2_451_545.0), epsilon = 1e-15);
        let r = (pos[0] * pos[0] + pos[1] * pos[1]).sqrt();
        assert_relative_eq!(r, XKMPER, epsilon = 1e-9);
        assert_relative_eq!(pos[2], 0.0, epsilon = 1e-12);
        // Surface speed at the equator ~0.465 km/s
        let v = (vel[0] * vel[0] + vel[1] * vel[1]).sqrt();
        assert_relative_eq!(v, XKMPER * MFACTOR, epsilon = 1e-9);
    }

    #[test]
    fn test_pole_position_uses_polar_radius() {
        let gs = GroundStation::new(90.0, 0.0, 1000.0);
        let (pos, _, _) = gs.position_velocity(2_451_545.0);
        let polar = XKMPER * (1.0 - FLATTENING);
        assert_relative_eq!(pos[2], polar + 1.0, epsilon = 1e-6);
        assert!(pos[0].abs() < 1e-9 && pos[1].abs() < 1e-9);
    }
}
