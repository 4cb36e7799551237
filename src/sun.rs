//! Low-precision solar ephemeris and Earth-shadow test.

use crate::constants::*;
use crate::propagator::{dot, norm};
use crate::time::modulus;

/// Difference between ephemeris time and UT (seconds) for a fractional year.
pub fn delta_et(year: f64) -> f64 {
    26.465 + 0.747622 * (year - 1950.0) + 1.886913 * (TAU * (year - 1975.0) / 33.0).sin()
}

/// Geocentric Sun position (km) in the true-equator frame at a Julian date.
pub fn sun_vector(jd: f64) -> [f64; 3] {
    let mjd = jd - 2_415_020.0;
    let year = 1900.0 + mjd / 365.25;
    let t = (mjd + delta_et(year) / SECDAY) / 36525.0;

    let m = DEG2RAD
        * modulus(
            358.47583 + modulus(35999.04975 * t, 360.0) - (0.000150 + 0.0000033 * t) * t * t,
            360.0,
        );
    let l = DEG2RAD
        * modulus(279.69668 + modulus(36000.76892 * t, 360.0) + 0.0003025 * t * t, 360.0);
    let e = 0.01675104 - (0.0000418 + 0.000000126 * t) * t;
    let c = DEG2RAD
        * ((1.919460 - (0.004789 + 0.000014 * t) * t) * m.sin()
            + (0.020094 - 0.000100 * t) * (2.0 * m).sin()
            + 0.000293 * (3.0 * m).sin());
    let o = DEG2RAD * modulus(259.18 - 1934.142 * t, 360.0);
    let lsa = modulus(l + c - DEG2RAD * (0.00569 - 0.00479 * o.sin()), TAU);
    let nu = modulus(m + c, TAU);
    let r = AU * 1.0000002 * (1.0 - e * e) / (1.0 + e * nu.cos());
    let eps = DEG2RAD
        * (23.452294 - (0.0130125 + (0.00000164 - 0.000000503 * t) * t) * t
            + 0.00256 * o.cos());

    [r * lsa.cos(), r * lsa.sin() * eps.cos(), r * lsa.sin() * eps.sin()]
}

/// Signed angular depth (rad) of a satellite inside the Earth's umbra.
/// Non-negative means eclipsed.
pub fn eclipse_depth(position: &[f64; 3], sun: &[f64; 3]) -> f64 {
    let r = norm(position);
    let sd_earth = (XKMPER / r).clamp(-1.0, 1.0).asin();
    let rho = [sun[0] - position[0], sun[1] - position[1], sun[2] - position[2]];
    let sd_sun = (SOLAR_RADIUS / norm(&rho)).asin();
    let earth = [-position[0], -position[1], -position[2]];
    let cos_delta = dot(sun, &earth) / (norm(sun) * r);
    let delta = cos_delta.clamp(-1.0, 1.0).acos();
    sd_earth - sd_sun - delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sun_distance_is_about_one_au() {
        // 2009-01-04 (near perihelion) and 2009-07-04 (near aphelion)
        let perihelion = norm(&sun_vector(2_454_835.5));
        let aphelion = norm(&sun_vector(2_455_016.5));
        assert_relative_eq!(perihelion / AU, 0.9833, epsilon = 1e-3);
        assert_relative_eq!(aphelion / AU, 1.0167, epsilon = 1e-3);
    }

    #[test]
    fn test_sun_declination_at_solstice() {
        // 2009-06-21 05:45 UTC
        let s = sun_vector(2_455_003.74);
        let dec = (s[2] / norm(&s)).asin() * RAD2DEG;
        assert_relative_eq!(dec, 23.44, epsilon = 0.05);
    }

    #[test]
    fn test_sun_at_march_equinox() {
        // 2009-03-20 11:44 UTC: right ascension and declination near zero
        let s = sun_vector(2_454_910.989);
        let dec = (s[2] / norm(&s)).asin() * RAD2DEG;
        assert!(dec.abs() < 0.05, "dec={dec}");
        assert!(s[0] > 0.0);
    }

    #[test]
    fn test_delta_et_1975() {
        assert_relative_eq!(delta_et(1975.0), 26.465 + 0.747622 * 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eclipse_behind_earth() {
        let sun = [AU, 0.0, 0.0];
        let shadowed = eclipse_depth(&[-(XKMPER + 500.0), 0.0, 0.0], &sun);
        assert!(shadowed > 0.0);
        let sunlit = eclipse_depth(&[XKMPER + 500.0, 0.0, 0.0], &sun);
        assert!(sunlit < 0.0);
        // Sideways: delta is 90°
        let side = eclipse_depth(&[0.0, XKMPER + 500.0, 0.0], &sun);
        assert!(side < 0.0);
    }
}
