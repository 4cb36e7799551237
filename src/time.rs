//! Time scales and angle helpers shared by the propagator and observer geometry.
//!
//! Instants enter the crate as `chrono::DateTime<Utc>`; internally everything
//! runs on fractional day numbers counted from 1979-12-31 00:00:00 UTC, the
//! origin used by the PREDICT family of trackers.

use chrono::{DateTime, Utc};

use crate::constants::*;

/// Unix milliseconds of the day-number origin, 1979-12-31T00:00:00Z.
const DAYNUM_EPOCH_MILLIS: i64 = 315_446_400_000;

/// Julian date of the day-number origin.
pub const DAYNUM_JULIAN_OFFSET: f64 = 2_444_238.5;

/// Julian date of J2000.0.
const J2000: f64 = 2_451_545.0;

/// Fractional days elapsed since 1979-12-31 00:00:00 UTC, to the millisecond.
pub fn day_number(instant: DateTime<Utc>) -> f64 {
    let millis = instant.timestamp_millis() - DAYNUM_EPOCH_MILLIS;
    millis as f64 / 1000.0 / 60.0 / 60.0 / 24.0
}

/// Julian date (UTC) of an instant.
pub fn julian_date(instant: DateTime<Utc>) -> f64 {
    day_number(instant) + DAYNUM_JULIAN_OFFSET
}

/// Instant from fractional UNIX seconds. `None` for non-finite or
/// out-of-range input.
pub fn from_unix_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Julian date of January 0.0 of `year` (i.e. 31 December of the prior year).
pub fn julian_date_of_year(year: i32) -> f64 {
    let a_year = i64::from(year) - 1;
    let a = (a_year as f64 / 100.0).floor() as i64;
    let b = 2 - a + a / 4;
    let i = (365.25 * a_year as f64).floor() as i64 + 428;
    i as f64 + 1_720_994.5 + b as f64
}

/// Greenwich mean sidereal angle (rad) at a Julian date.
pub fn theta_g_jd(jd: f64) -> f64 {
    let ut = (jd + 0.5).fract();
    let tu = (jd - ut - J2000) / 36525.0;
    let mut gmst = 24110.54841 + tu * (8_640_184.812_866 + tu * (0.093104 - tu * 6.2e-6));
    gmst = modulus(gmst + SECDAY * OMEGA_E * ut, SECDAY);
    TAU * gmst / SECDAY
}

/// Reduce an angle to [0, 2π).
pub fn fmod2p(x: f64) -> f64 {
    modulus(x, TAU)
}

/// Truncating modulus shifted into [0, divisor).
pub fn modulus(x: f64, divisor: f64) -> f64 {
    let whole = (x / divisor).trunc();
    let mut ret = x - whole * divisor;
    if ret < 0.0 {
        ret += divisor;
    }
    ret
}

/// Four-quadrant arctangent in [0, 2π), from a sine and cosine.
pub fn ac_tan(sinx: f64, cosx: f64) -> f64 {
    use std::f64::consts::{FRAC_PI_2, PI};

    if cosx == 0.0 {
        if sinx > 0.0 {
            FRAC_PI_2
        } else {
            3.0 * FRAC_PI_2
        }
    } else if cosx > 0.0 {
        if sinx > 0.0 {
            (sinx / cosx).atan()
        } else {
            TAU + (sinx / cosx).atan()
        }
    } else {
        PI + (sinx / cosx).atan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_day_number_regression() {
        let cases = [
            ("1983-01-06T12:34:45.013Z", 1102.5241320949074),
            ("1997-08-06T12:34:45.013Z", 6428.524132094907),
            ("2001-05-06T12:34:45.013Z", 7797.524132094907),
            ("2014-12-06T12:34:45.013Z", 12759.524132094906),
            ("2029-12-06T12:34:45.013Z", 18238.524132094906),
            ("2033-12-06T12:34:45.013Z", 19699.524132094906),
        ];
        for (s, expected) in cases {
            assert_relative_eq!(day_number(at(s)), expected, epsilon = 1e-11);
        }
    }

    #[test]
    fn test_day_number_origin() {
        assert_eq!(day_number(at("1979-12-31T00:00:00Z")), 0.0);
        assert_eq!(day_number(at("1980-01-01T00:00:00Z")), 1.0);
    }

    #[test]
    fn test_julian_date_of_year() {
        // 2000 January 0.0 = 1999 December 31.0
        assert_relative_eq!(julian_date_of_year(2000), 2_451_543.5, epsilon = 1e-9);
        assert_relative_eq!(julian_date_of_year(1980), 2_444_238.5, epsilon = 1e-9);
    }

    #[test]
    fn test_julian_date_j2000() {
        assert_relative_eq!(julian_date(at("2000-01-01T12:00:00Z")), J2000, epsilon = 1e-9);
    }

    #[test]
    fn test_theta_g_at_j2000() {
        // GMST at J2000.0 is 280.46061837°
        assert_relative_eq!(theta_g_jd(J2000) * RAD2DEG, 280.460_618, epsilon = 1e-4);
    }

    #[test]
    fn test_from_unix_seconds() {
        assert_eq!(from_unix_seconds(1_231_128_490.5), Some(at("2009-01-05T04:08:10.5Z")));
        assert_eq!(from_unix_seconds(-0.25), Some(at("1969-12-31T23:59:59.75Z")));
        assert_eq!(from_unix_seconds(f64::NAN), None);
        assert_eq!(from_unix_seconds(f64::INFINITY), None);
        assert_eq!(from_unix_seconds(1e300), None);
    }

    #[test]
    fn test_fmod2p_wraps_negative() {
        assert_relative_eq!(fmod2p(-0.5), TAU - 0.5, epsilon = 1e-12);
        assert_relative_eq!(fmod2p(TAU + 0.25), 0.25, epsilon = 1e-12);
        assert_relative_eq!(modulus(370.0, 360.0), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ac_tan_quadrants() {
        use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
        assert_relative_eq!(ac_tan(1.0, 1.0), FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(ac_tan(1.0, -1.0), PI - FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(ac_tan(-1.0, -1.0), PI + FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(ac_tan(-1.0, 1.0), TAU - FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(ac_tan(1.0, 0.0), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(ac_tan(-1.0, 0.0), 3.0 * FRAC_PI_2, epsilon = 1e-12);
    }
}
