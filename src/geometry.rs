//! Observer geometry: sub-satellite point and topocentric look angles.

use std::f64::consts::PI;

use crate::constants::*;
use crate::propagator::{dot, norm, EciState};
use crate::station::GroundStation;
use crate::time::{fmod2p, theta_g_jd};

/// Geodetic sub-satellite point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundTrack {
    /// Geodetic latitude (rad, north positive)
    pub latitude: f64,
    /// East longitude (rad, [0, 2π))
    pub longitude: f64,
    /// Height above the ellipsoid (km)
    pub altitude: f64,
    /// Right ascension of the position vector (rad, (-π, π])
    pub theta: f64,
}

/// Look angles from a ground station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    /// Azimuth (rad, [0, 2π), clockwise from north)
    pub azimuth: f64,
    /// Elevation (rad)
    pub elevation: f64,
    /// Slant range (km)
    pub range: f64,
    /// Range rate (km/s, positive receding)
    pub range_rate: f64,
    /// Elevation exceeds the station's horizon mask toward this azimuth
    pub above_horizon: bool,
    /// Station local sidereal angle (rad)
    pub local_sidereal_angle: f64,
}

/// Sub-satellite point of an inertial position at a Julian date.
pub fn ground_track(position: &[f64; 3], jd: f64) -> GroundTrack {
    let [x, y, z] = *position;
    let theta = y.atan2(x);
    let longitude = fmod2p(theta - theta_g_jd(jd));
    let r = x.hypot(y);
    let e2 = FLATTENING * (2.0 - FLATTENING);

    let mut latitude = z.atan2(r);
    let mut c = 1.0;
    for _ in 0..GEODETIC_MAX_ITERATIONS {
        let phi = latitude;
        let sin_phi = phi.sin();
        c = 1.0 / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        latitude = (z + XKMPER * c * e2 * sin_phi).atan2(r);
        if (latitude - phi).abs() < GEODETIC_TOLERANCE {
            break;
        }
    }

    GroundTrack {
        latitude,
        longitude,
        altitude: r / latitude.cos() - XKMPER * c,
        theta,
    }
}

/// Azimuth, elevation, range and range rate of a satellite seen from a station.
pub fn look_angles(sat: &EciState, station: &GroundStation, jd: f64) -> LookAngles {
    let (obs_pos, obs_vel, theta) = station.position_velocity(jd);

    let range_vec = [
        sat.position[0] - obs_pos[0],
        sat.position[1] - obs_pos[1],
        sat.position[2] - obs_pos[2],
    ];
    let range_vel = [
        sat.velocity[0] - obs_vel[0],
        sat.velocity[1] - obs_vel[1],
        sat.velocity[2] - obs_vel[2],
    ];
    let range = norm(&range_vec);

    let (sin_lat, cos_lat) = (station.latitude * DEG2RAD).sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    // South-east-zenith components
    let top_s = sin_lat * cos_theta * range_vec[0] + sin_lat * sin_theta * range_vec[1]
        - cos_lat * range_vec[2];
    let top_e = -sin_theta * range_vec[0] + cos_theta * range_vec[1];
    let top_z = cos_lat * cos_theta * range_vec[0]
        + cos_lat * sin_theta * range_vec[1]
        + sin_lat * range_vec[2];

    let mut azimuth = (-top_e / top_s).atan();
    if top_s > 0.0 {
        azimuth += PI;
    }
    if azimuth < 0.0 {
        azimuth += TAU;
    }
    let elevation = (top_z / range).asin();

    LookAngles {
        azimuth,
        elevation,
        range,
        range_rate: dot(&range_vec, &range_vel) / range,
        above_horizon: above_horizon(station, azimuth, elevation),
        local_sidereal_angle: theta,
    }
}

/// Whether an elevation clears the station's mask toward `azimuth`.
pub fn above_horizon(station: &GroundStation, azimuth: f64, elevation: f64) -> bool {
    elevation * RAD2DEG - station.horizon_elevation(azimuth) > 1e-12
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const JD: f64 = 2_454_938.5;

    /// A satellite `height` km straight above the station.
    fn overhead(station: &GroundStation, height: f64) -> EciState {
        let (pos, vel, _) = station.position_velocity(JD);
        let r = norm(&pos);
        let up = [pos[0] / r, pos[1] / r, pos[2] / r];
        EciState {
            position: [pos[0] + up[0] * height, pos[1] + up[1] * height, pos[2] + up[2] * height],
            velocity: vel,
            phase: 0.0,
            converged: true,
        }
    }

    #[test]
    fn test_ground_track_equator() {
        let track = ground_track(&[XKMPER + 500.0, 0.0, 0.0], JD);
        assert_relative_eq!(track.latitude, 0.0, epsilon = 1e-12);
        assert_relative_eq!(track.altitude, 500.0, epsilon = 1e-9);
        assert_relative_eq!(track.theta, 0.0, epsilon = 1e-12);
        assert_relative_eq!(track.longitude, fmod2p(-theta_g_jd(JD)), epsilon = 1e-12);
    }

    #[test]
    fn test_ground_track_inverts_station_position() {
        let station = GroundStation::new(52.4670, -2.022, 0.0);
        let (pos, _, _) = station.position_velocity(JD);
        let track = ground_track(&pos, JD);
        assert_relative_eq!(track.latitude * RAD2DEG, station.latitude, epsilon = 1e-6);
        assert_relative_eq!(track.longitude * RAD2DEG, 360.0 + station.longitude, epsilon = 1e-6);
        assert_relative_eq!(track.altitude, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_overhead_satellite_is_at_zenith() {
        let station = GroundStation::new(40.0, 20.0, 100.0);
        let look = look_angles(&overhead(&station, 800.0), &station, JD);
        // Geocentric and geodetic verticals differ by ~0.19° at 40°N
        assert!(look.elevation * RAD2DEG > 89.5, "el={}", look.elevation * RAD2DEG);
        assert_relative_eq!(look.range, 800.0, epsilon = 1.0);
        assert_relative_eq!(look.range_rate, 0.0, epsilon = 1e-9);
        assert!(look.above_horizon);
    }

    #[test]
    fn test_azimuth_of_northern_target() {
        let station = GroundStation::new(0.0, 0.0, 0.0);
        // Point well north of the station on its meridian plane
        let (pos, vel, theta) = station.position_velocity(JD);
        let sat = EciState {
            position: [pos[0] + 100.0 * theta.cos(), pos[1] + 100.0 * theta.sin(), 2000.0],
            velocity: vel,
            phase: 0.0,
            converged: true,
        };
        let look = look_angles(&sat, &station, JD);
        let az = look.azimuth * RAD2DEG;
        assert!(!(1.0..359.0).contains(&az), "az={az}");
        assert!(look.elevation > 0.0);
    }

    #[test]
    fn test_horizon_mask_blocks_low_elevation() {
        let mut mask = vec![0.0; 36];
        mask[9] = 20.0;
        let station = GroundStation::new(0.0, 0.0, 0.0).with_horizon_mask(&mask).unwrap();
        let east = 95.0 * DEG2RAD;
        assert!(!above_horizon(&station, east, 10.0 * DEG2RAD));
        assert!(above_horizon(&station, east, 25.0 * DEG2RAD));
        assert!(above_horizon(&station, 45.0 * DEG2RAD, 10.0 * DEG2RAD));
        assert!(!above_horizon(&station, 45.0 * DEG2RAD, 0.0));
    }
}
