//! Orbital element sets.
//!
//! [`ElementSet`] is the plain record an external TLE parser fills in, with
//! angles in degrees and mean motion in revolutions per day exactly as they
//! appear on the element lines. [`OrbitalElements`] is the validated form the
//! propagator consumes: angles converted to radians and mean motion to
//! radians per minute once, at construction, and immutable afterwards.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::PredictError;
use crate::time::julian_date_of_year;

/// Raw element set fields (degrees, revolutions per day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSet {
    /// Satellite name (from line 0, if present).
    pub name: Option<String>,
    /// NORAD catalog number.
    pub catalog_number: u32,
    /// Epoch year (full 4-digit year).
    pub epoch_year: i32,
    /// Epoch day of year (fractional, 1.0 = January 1 00:00 UTC).
    pub epoch_day: f64,
    /// Inclination (degrees).
    pub inclination_deg: f64,
    /// Right ascension of ascending node (degrees).
    pub raan_deg: f64,
    /// Eccentricity (dimensionless).
    pub eccentricity: f64,
    /// Argument of perigee (degrees).
    pub arg_perigee_deg: f64,
    /// Mean anomaly (degrees).
    pub mean_anomaly_deg: f64,
    /// Mean motion (revolutions per day).
    pub mean_motion: f64,
    /// First derivative of mean motion (rev/day²) / 2.
    pub mean_motion_dot: f64,
    /// Second derivative of mean motion (rev/day³) / 6.
    pub mean_motion_ddot: f64,
    /// B* drag term (1/Earth radii).
    pub bstar: f64,
    /// Revolution number at epoch.
    pub orbit_number: u32,
    /// Element set number.
    pub element_set: u16,
}

/// A validated element set in propagator units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElementSet", into = "ElementSet")]
pub struct OrbitalElements {
    raw: ElementSet,
    /// Inclination (rad)
    xincl: f64,
    /// RAAN (rad)
    xnodeo: f64,
    /// Argument of perigee (rad)
    omegao: f64,
    /// Mean anomaly (rad)
    xmo: f64,
    /// Mean motion (rad/min)
    xno: f64,
    /// Julian date of the epoch
    epoch_jd: f64,
}

impl OrbitalElements {
    /// Validate a raw element set and convert it to propagator units.
    pub fn new(raw: ElementSet) -> Result<Self, PredictError> {
        let e = raw.eccentricity;
        if !e.is_finite() || !(0.0..1.0).contains(&e) {
            return Err(PredictError::invalid("eccentricity", e, "must lie in [0, 1)"));
        }
        let n = raw.mean_motion;
        if !n.is_finite() || n <= 0.0 {
            return Err(PredictError::invalid("mean_motion", n, "must be positive and finite"));
        }
        let finite_fields = [
            ("inclination", raw.inclination_deg),
            ("raan", raw.raan_deg),
            ("arg_perigee", raw.arg_perigee_deg),
            ("mean_anomaly", raw.mean_anomaly_deg),
            ("mean_motion_dot", raw.mean_motion_dot),
            ("mean_motion_ddot", raw.mean_motion_ddot),
            ("bstar", raw.bstar),
        ];
        for (field, value) in finite_fields {
            if !value.is_finite() {
                return Err(PredictError::invalid(field, value, "must be finite"));
            }
        }
        if !(0.0..=180.0).contains(&raw.inclination_deg) {
            return Err(PredictError::invalid(
                "inclination",
                raw.inclination_deg,
                "must lie in [0, 180] degrees",
            ));
        }
        if !raw.epoch_day.is_finite() || !(1.0..367.0).contains(&raw.epoch_day) {
            return Err(PredictError::invalid("epoch_day", raw.epoch_day, "must lie in [1, 367)"));
        }

        Ok(OrbitalElements {
            xincl: raw.inclination_deg * DEG2RAD,
            xnodeo: raw.raan_deg * DEG2RAD,
            omegao: raw.arg_perigee_deg * DEG2RAD,
            xmo: raw.mean_anomaly_deg * DEG2RAD,
            xno: n * TAU / XMNPDA,
            epoch_jd: julian_date_of_year(raw.epoch_year) + raw.epoch_day,
            raw,
        })
    }

    /// The raw record these elements were built from.
    pub fn raw(&self) -> &ElementSet {
        &self.raw
    }

    pub fn name(&self) -> Option<&str> {
        self.raw.name.as_deref()
    }

    pub fn catalog_number(&self) -> u32 {
        self.raw.catalog_number
    }

    /// Inclination (rad).
    pub fn inclination_rad(&self) -> f64 {
        self.xincl
    }

    /// Right ascension of ascending node (rad).
    pub fn raan_rad(&self) -> f64 {
        self.xnodeo
    }

    pub fn eccentricity(&self) -> f64 {
        self.raw.eccentricity
    }

    /// Argument of perigee (rad).
    pub fn arg_perigee_rad(&self) -> f64 {
        self.omegao
    }

    /// Mean anomaly at epoch (rad).
    pub fn mean_anomaly_rad(&self) -> f64 {
        self.xmo
    }

    /// Kozai mean motion (rad/min).
    pub fn mean_motion_rad_per_min(&self) -> f64 {
        self.xno
    }

    /// Mean motion as given (rev/day).
    pub fn mean_motion(&self) -> f64 {
        self.raw.mean_motion
    }

    /// B* drag term (1/Earth radii).
    pub fn bstar(&self) -> f64 {
        self.raw.bstar / AE
    }

    /// Julian date of the epoch.
    pub fn epoch_julian(&self) -> f64 {
        self.epoch_jd
    }

    /// Nominal orbital period from the raw mean motion (minutes).
    pub fn period_minutes(&self) -> f64 {
        XMNPDA / self.raw.mean_motion
    }

    /// Brouwer mean motion (rad/min), recovered from the Kozai value.
    pub fn recovered_mean_motion(&self) -> f64 {
        let a1 = (XKE / self.xno).powf(TOTHRD);
        let cosio = self.xincl.cos();
        let x3thm1 = 3.0 * cosio * cosio - 1.0;
        let betao2 = 1.0 - self.raw.eccentricity * self.raw.eccentricity;
        let betao = betao2.sqrt();
        let temp = 1.5 * CK2 * x3thm1 / (betao * betao2);
        let del1 = temp / (a1 * a1);
        let a0 = a1 * (1.0 - del1 * (0.5 * TOTHRD + del1 * (1.0 + 134.0 / 81.0 * del1)));
        let delo = temp / (a0 * a0);
        self.xno / (1.0 + delo)
    }

    /// Whether the recovered period is long enough for the deep-space model.
    pub fn is_deep_space(&self) -> bool {
        TAU / self.recovered_mean_motion() >= DEEP_SPACE_PERIOD_MINUTES
    }

    /// Semi-major axis from mean motion (km).
    ///
    /// 331.25 km is the semi-major axis of a one-revolution-per-day orbit
    /// scaled by (1/1440)^(2/3).
    pub fn semi_major_axis_km(&self) -> f64 {
        331.25 * ((XMNPDA / self.raw.mean_motion).ln() * TOTHRD).exp()
    }

    /// Apogee altitude above the equatorial radius (km).
    pub fn apogee_km(&self) -> f64 {
        self.semi_major_axis_km() * (1.0 + self.raw.eccentricity) - XKMPER
    }

    /// Perigee altitude above the equatorial radius (km).
    pub fn perigee_km(&self) -> f64 {
        self.semi_major_axis_km() * (1.0 - self.raw.eccentricity) - XKMPER
    }
}

impl TryFrom<ElementSet> for OrbitalElements {
    type Error = PredictError;

    fn try_from(raw: ElementSet) -> Result<Self, Self::Error> {
        OrbitalElements::new(raw)
    }
}

impl From<OrbitalElements> for ElementSet {
    fn from(elements: OrbitalElements) -> Self {
        elements.raw
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ao51_units() {
        let el = OrbitalElements::new(ao51()).unwrap();
        assert_relative_eq!(el.inclination_rad(), 98.0551 * DEG2RAD, epsilon = 1e-12);
        assert_relative_eq!(el.mean_motion_rad_per_min(), 14.4063845 * TAU / 1440.0, epsilon = 1e-12);
        assert_relative_eq!(el.period_minutes(), 99.955, epsilon = 1e-3);
        assert!(!el.is_deep_space());
    }

    #[test]
    fn test_epoch_julian() {
        let el = OrbitalElements::new(ao51()).unwrap();
        // 2009 January 0.0 = JD 2454831.5
        assert_relative_eq!(el.epoch_julian(), 2_454_831.5 + 105.66391970, epsilon = 1e-9);
    }

    #[test]
    fn test_ao51_altitudes() {
        let el = OrbitalElements::new(ao51()).unwrap();
        let perigee = el.perigee_km();
        let apogee = el.apogee_km();
        assert!(perigee > 650.0 && perigee < 750.0, "perigee={perigee}");
        assert!(apogee > 750.0 && apogee < 900.0, "apogee={apogee}");
    }

    #[test]
    fn test_deep_space_selection() {
        assert!(OrbitalElements::new(ao40()).unwrap().is_deep_space());
        assert!(OrbitalElements::new(geo()).unwrap().is_deep_space());
        assert!(OrbitalElements::new(molniya()).unwrap().is_deep_space());
    }

    #[test]
    fn test_rejects_bad_eccentricity() {
        let mut raw = ao51();
        raw.eccentricity = 1.0;
        assert!(matches!(
            OrbitalElements::new(raw),
            Err(PredictError::InvalidOrbitalElements { field: "eccentricity", .. })
        ));

        let mut raw = ao51();
        raw.eccentricity = -0.1;
        assert!(OrbitalElements::new(raw).is_err());
    }

    #[test]
    fn test_rejects_non_positive_mean_motion() {
        for n in [0.0, -1.0, f64::NAN] {
            let mut raw = ao51();
            raw.mean_motion = n;
            assert!(matches!(
                OrbitalElements::new(raw),
                Err(PredictError::InvalidOrbitalElements { field: "mean_motion", .. })
            ));
        }
    }

    #[test]
    fn test_rejects_non_finite_drag() {
        let mut raw = ao51();
        raw.bstar = f64::INFINITY;
        assert!(matches!(
            OrbitalElements::new(raw),
            Err(PredictError::InvalidOrbitalElements { field: "bstar", .. })
        ));
    }
}
