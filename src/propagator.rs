//! Orbit propagation: SGP4 (near earth) and SDP4 (deep space).
//!
//! A [`Propagator`] is built once from an [`OrbitalElements`] set. The model
//! variant is chosen at construction from the recovered orbital period
//! (≥ 225 minutes selects deep space) and never changes afterwards.
//!
//! # Architecture
//! Both variants share the epoch initialisation ([`Secular`]), the Kepler
//! solver and the short-periodic update ([`osculate`]). The near-earth variant
//! adds the higher-order drag terms; the deep-space variant adds lunar/solar
//! perturbations and geopotential resonance. Evaluation is a pure function of
//! the element set and the instant: nothing is cached between calls.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::deep_space::DeepSpace;
use crate::elements::OrbitalElements;
use crate::error::PredictError;
use crate::geometry::{self, GroundTrack, LookAngles};
use crate::near_earth::NearEarth;
use crate::state::{SatelliteState, Topocentric};
use crate::station::GroundStation;
use crate::sun;
use crate::time::{ac_tan, fmod2p, julian_date};

// ── State vector ──

/// Cartesian state in the true-equator mean-equinox frame of the element epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EciState {
    /// Position (km): [x, y, z]
    pub position: [f64; 3],
    /// Velocity (km/s): [vx, vy, vz]
    pub velocity: [f64; 3],
    /// Orbital phase: mean anomaly measured from perigee (rad, [0, 2π))
    pub phase: f64,
    /// False when the Kepler or resonance solver hit its iteration cap.
    pub converged: bool,
}

impl EciState {
    /// Distance from the Earth's centre (km).
    pub fn radius(&self) -> f64 {
        norm(&self.position)
    }
}

// ── Epoch initialisation shared by both variants ──

/// Epoch-derived quantities common to SGP4 and SDP4.
#[derive(Debug, Clone)]
pub(crate) struct Secular {
    pub cosio: f64,
    pub sinio: f64,
    pub theta2: f64,
    pub x3thm1: f64,
    pub x1mth2: f64,
    pub x7thm1: f64,
    pub eosq: f64,
    pub betao: f64,
    pub betao2: f64,
    /// Brouwer mean motion (rad/min)
    pub xnodp: f64,
    /// Brouwer semi-major axis (Earth radii)
    pub aodp: f64,
    /// Atmospheric density parameter s, adjusted for low perigee
    pub s4: f64,
    pub tsi: f64,
    pub eta: f64,
    pub etasq: f64,
    pub eeta: f64,
    pub coef: f64,
    pub coef1: f64,
    pub a3ovk2: f64,
    pub c1: f64,
    pub c4: f64,
    pub xmdot: f64,
    pub omgdot: f64,
    pub xnodot: f64,
    pub xnodcf: f64,
    pub t2cof: f64,
    pub xlcof: f64,
    pub aycof: f64,
}

impl Secular {
    pub fn new(el: &OrbitalElements) -> Self {
        let eo = el.eccentricity();
        let xincl = el.inclination_rad();
        let xno = el.mean_motion_rad_per_min();
        let bstar = el.bstar();

        // Recover original mean motion and semi-major axis from the input elements
        let a1 = (XKE / xno).powf(TOTHRD);
        let cosio = xincl.cos();
        let theta2 = cosio * cosio;
        let x3thm1 = 3.0 * theta2 - 1.0;
        let eosq = eo * eo;
        let betao2 = 1.0 - eosq;
        let betao = betao2.sqrt();
        let del1 = 1.5 * CK2 * x3thm1 / (a1 * a1 * betao * betao2);
        let ao = a1 * (1.0 - del1 * (0.5 * TOTHRD + del1 * (1.0 + 134.0 / 81.0 * del1)));
        let delo = 1.5 * CK2 * x3thm1 / (ao * ao * betao * betao2);
        let xnodp = xno / (1.0 + delo);
        let aodp = ao / (1.0 - delo);

        // For perigee below 156 km the values of s and qoms2t are altered
        let mut s4 = S;
        let mut qoms24 = QOMS2T;
        let perigee = (aodp * (1.0 - eo) - AE) * XKMPER;
        if perigee < 156.0 {
            s4 = if perigee <= 98.0 { 20.0 } else { perigee - 78.0 };
            qoms24 = ((120.0 - s4) * AE / XKMPER).powi(4);
            s4 = s4 / XKMPER + AE;
        }

        let pinvsq = 1.0 / (aodp * aodp * betao2 * betao2);
        let tsi = 1.0 / (aodp - s4);
        let eta = aodp * eo * tsi;
        let etasq = eta * eta;
        let eeta = eo * eta;
        let psisq = (1.0 - etasq).abs();
        let coef = qoms24 * tsi.powi(4);
        let coef1 = coef / psisq.powf(3.5);
        let c2 = coef1
            * xnodp
            * (aodp * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
                + 0.75 * CK2 * tsi / psisq * x3thm1 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
        let c1 = bstar * c2;
        let sinio = xincl.sin();
        let a3ovk2 = -XJ3 / CK2 * AE.powi(3);
        let x1mth2 = 1.0 - theta2;
        let c4 = 2.0
            * xnodp
            * coef1
            * aodp
            * betao2
            * (eta * (2.0 + 0.5 * etasq) + eo * (0.5 + 2.0 * etasq)
                - 2.0 * CK2 * tsi / (aodp * psisq)
                    * (-3.0 * x3thm1 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                        + 0.75
                            * x1mth2
                            * (2.0 * etasq - eeta * (1.0 + etasq))
                            * (2.0 * el.arg_perigee_rad()).cos()));

        let theta4 = theta2 * theta2;
        let temp1 = 3.0 * CK2 * pinvsq * xnodp;
        let temp2 = temp1 * CK2 * pinvsq;
        let temp3 = 1.25 * CK4 * pinvsq * pinvsq * xnodp;
        let xmdot = xnodp
            + 0.5 * temp1 * betao * x3thm1
            + 0.0625 * temp2 * betao * (13.0 - 78.0 * theta2 + 137.0 * theta4);
        let x1m5th = 1.0 - 5.0 * theta2;
        let omgdot = -0.5 * temp1 * x1m5th
            + 0.0625 * temp2 * (7.0 - 114.0 * theta2 + 395.0 * theta4)
            + temp3 * (3.0 - 36.0 * theta2 + 49.0 * theta4);
        let xhdot1 = -temp1 * cosio;
        let xnodot = xhdot1
            + (0.5 * temp2 * (4.0 - 19.0 * theta2) + 2.0 * temp3 * (3.0 - 7.0 * theta2)) * cosio;

        // 1 + cos(i) vanishes for retrograde equatorial orbits
        let one_plus_cosio = if (1.0 + cosio).abs() > 1.5e-12 { 1.0 + cosio } else { 1.5e-12 };

        Secular {
            cosio,
            sinio,
            theta2,
            x3thm1,
            x1mth2,
            x7thm1: 7.0 * theta2 - 1.0,
            eosq,
            betao,
            betao2,
            xnodp,
            aodp,
            s4,
            tsi,
            eta,
            etasq,
            eeta,
            coef,
            coef1,
            a3ovk2,
            c1,
            c4,
            xmdot,
            omgdot,
            xnodot,
            xnodcf: 3.5 * betao2 * xhdot1 * c1,
            t2cof: 1.5 * c1,
            xlcof: 0.125 * a3ovk2 * sinio * (3.0 + 5.0 * cosio) / one_plus_cosio,
            aycof: 0.25 * a3ovk2 * sinio,
        }
    }

    fn is_finite(&self) -> bool {
        [self.xnodp, self.aodp, self.c1, self.c4, self.xmdot, self.omgdot, self.xnodot]
            .iter()
            .all(|v| v.is_finite())
    }
}

// ── Kepler's equation ──

/// Eccentric longitude terms from the equinoctial Kepler solution.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeplerSolution {
    pub sinepw: f64,
    pub cosepw: f64,
    /// e·cos(E)
    pub ecose: f64,
    /// e·sin(E)
    pub esine: f64,
    pub converged: bool,
}

/// Solve the equinoctial Kepler equation `U = E − axn·sin E + ayn·cos E` by
/// Newton iteration. Returns the last iterate when the cap is reached.
pub(crate) fn solve_kepler(capu: f64, axn: f64, ayn: f64) -> KeplerSolution {
    let mut epw = capu;
    let mut converged = false;
    let (mut sinepw, mut cosepw) = epw.sin_cos();

    for _ in 0..KEPLER_MAX_ITERATIONS {
        (sinepw, cosepw) = epw.sin_cos();
        let next = (capu - ayn * cosepw + axn * sinepw - epw)
            / (1.0 - axn * cosepw - ayn * sinepw)
            + epw;
        if (next - epw).abs() <= KEPLER_TOLERANCE {
            converged = true;
            break;
        }
        epw = next;
    }

    KeplerSolution {
        sinepw,
        cosepw,
        ecose: axn * cosepw + ayn * sinepw,
        esine: axn * sinepw - ayn * cosepw,
        converged,
    }
}

// ── Periodic update shared by both variants ──

/// Mean elements at `tsince`, after secular (and deep-space) updates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MeanState {
    /// Semi-major axis (Earth radii)
    pub a: f64,
    pub e: f64,
    /// Argument of perigee, drag-corrected (rad)
    pub omega: f64,
    /// Mean longitude M + ω + Ω (rad)
    pub xl: f64,
    pub xnode: f64,
    pub xinc: f64,
    /// Argument of perigee the orbital phase is measured from (rad)
    pub omgadf: f64,
}

/// Apply long- and short-period periodics and orient the orbit in inertial space.
pub(crate) fn osculate(sec: &Secular, m: &MeanState) -> EciState {
    let beta = (1.0 - m.e * m.e).sqrt();
    let xn = XKE / m.a.powf(1.5);

    // Long period periodics
    let axn = m.e * m.omega.cos();
    let temp = 1.0 / (m.a * beta * beta);
    let xll = temp * sec.xlcof * axn;
    let aynl = temp * sec.aycof;
    let xlt = m.xl + xll;
    let ayn = m.e * m.omega.sin() + aynl;

    let capu = fmod2p(xlt - m.xnode);
    let kepler = solve_kepler(capu, axn, ayn);

    // Short period preliminary quantities
    let elsq = axn * axn + ayn * ayn;
    let temp = 1.0 - elsq;
    let pl = m.a * temp;
    let r = m.a * (1.0 - kepler.ecose);
    let temp1 = 1.0 / r;
    let rdot = XKE * m.a.sqrt() * kepler.esine * temp1;
    let rfdot = XKE * pl.sqrt() * temp1;
    let temp2 = m.a * temp1;
    let betal = temp.sqrt();
    let temp3 = 1.0 / (1.0 + betal);
    let cosu = temp2 * (kepler.cosepw - axn + ayn * kepler.esine * temp3);
    let sinu = temp2 * (kepler.sinepw - ayn - axn * kepler.esine * temp3);
    let u = ac_tan(sinu, cosu);
    let sin2u = 2.0 * sinu * cosu;
    let cos2u = 2.0 * cosu * cosu - 1.0;
    let temp = 1.0 / pl;
    let temp1 = CK2 * temp;
    let temp2 = temp1 * temp;

    // Update for short periodics
    let rk = r * (1.0 - 1.5 * temp2 * betal * sec.x3thm1) + 0.5 * temp1 * sec.x1mth2 * cos2u;
    let uk = u - 0.25 * temp2 * sec.x7thm1 * sin2u;
    let xnodek = m.xnode + 1.5 * temp2 * sec.cosio * sin2u;
    let xinck = m.xinc + 1.5 * temp2 * sec.cosio * sec.sinio * cos2u;
    let rdotk = rdot - xn * temp1 * sec.x1mth2 * sin2u;
    let rfdotk = rfdot + xn * temp1 * (sec.x1mth2 * cos2u + 1.5 * sec.x3thm1);

    // Orientation vectors
    let (sinuk, cosuk) = uk.sin_cos();
    let (sinik, cosik) = xinck.sin_cos();
    let (sinnok, cosnok) = xnodek.sin_cos();
    let xmx = -sinnok * cosik;
    let xmy = cosnok * cosik;
    let ux = xmx * sinuk + cosnok * cosuk;
    let uy = xmy * sinuk + sinnok * cosuk;
    let uz = sinik * sinuk;
    let vx = xmx * cosuk - cosnok * sinuk;
    let vy = xmy * cosuk - sinnok * sinuk;
    let vz = sinik * cosuk;

    let mut phase = xlt - m.xnode - m.omgadf + TAU;
    if phase < 0.0 {
        phase += TAU;
    }

    let pos_scale = XKMPER / AE;
    let vel_scale = XKMPER / AE * XMNPDA / SECDAY;
    EciState {
        position: [rk * ux * pos_scale, rk * uy * pos_scale, rk * uz * pos_scale],
        velocity: [
            (rdotk * ux + rfdotk * vx) * vel_scale,
            (rdotk * uy + rfdotk * vy) * vel_scale,
            (rdotk * uz + rfdotk * vz) * vel_scale,
        ],
        phase: fmod2p(phase),
        converged: kepler.converged,
    }
}

// ── Propagator ──

#[derive(Debug, Clone)]
enum Model {
    NearEarth(NearEarth),
    DeepSpace(Box<DeepSpace>),
}

/// SGP4/SDP4 propagator for one element set.
#[derive(Debug, Clone)]
pub struct Propagator {
    elements: OrbitalElements,
    model: Model,
}

impl Propagator {
    /// Initialise the model for an element set, selecting the variant from
    /// its recovered period.
    pub fn new(elements: OrbitalElements) -> Result<Self, PredictError> {
        let model = if elements.is_deep_space() {
            let deep = DeepSpace::new(&elements);
            if !deep.secular().is_finite() {
                return Err(degenerate(&elements));
            }
            Model::DeepSpace(Box::new(deep))
        } else {
            let near = NearEarth::new(&elements);
            if !near.secular().is_finite() {
                return Err(degenerate(&elements));
            }
            Model::NearEarth(near)
        };

        debug!(
            "Satellite {}: {} model, period {:.1} min",
            elements.catalog_number(),
            if matches!(model, Model::DeepSpace(_)) { "SDP4" } else { "SGP4" },
            elements.period_minutes()
        );

        Ok(Propagator { elements, model })
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    /// Whether the deep-space (SDP4) variant was selected.
    pub fn is_deep_space(&self) -> bool {
        matches!(self.model, Model::DeepSpace(_))
    }

    /// Minutes elapsed from the element epoch to `instant`.
    pub fn minutes_since_epoch(&self, instant: DateTime<Utc>) -> f64 {
        (julian_date(instant) - self.elements.epoch_julian()) * XMNPDA
    }

    /// Inertial state `tsince` minutes after epoch.
    pub fn propagate(&self, tsince: f64) -> EciState {
        match &self.model {
            Model::NearEarth(model) => model.propagate(&self.elements, tsince),
            Model::DeepSpace(model) => model.propagate(&self.elements, tsince),
        }
    }

    /// Inertial state at an absolute instant.
    pub fn evaluate(&self, instant: DateTime<Utc>) -> Snapshot {
        Snapshot {
            time: instant,
            julian: julian_date(instant),
            eci: self.propagate(self.minutes_since_epoch(instant)),
        }
    }

    /// Full state at `instant`, including look angles from `station`.
    pub fn position(&self, station: &GroundStation, instant: DateTime<Utc>) -> SatelliteState {
        self.evaluate(instant).to_state(Some(station))
    }

    /// Fast feasibility check: can the footprint ever reach the station's latitude?
    pub fn will_be_seen(&self, station: &GroundStation) -> bool {
        will_be_seen(&self.elements, station)
    }
}

fn degenerate(elements: &OrbitalElements) -> PredictError {
    PredictError::invalid(
        "mean_motion",
        elements.mean_motion(),
        "yields a degenerate orbit",
    )
}

/// Whether any part of the orbit can rise above the horizon at the station's latitude.
pub fn will_be_seen(elements: &OrbitalElements, station: &GroundStation) -> bool {
    let mut lin = elements.raw().inclination_deg;
    if lin >= 90.0 {
        lin = 180.0 - lin;
    }
    let apogee = elements.apogee_km();
    (XKMPER / (apogee + XKMPER)).acos() + lin * DEG2RAD > (station.latitude * DEG2RAD).abs()
}

// ── Snapshot ──

/// Inertial state at one instant, from which the observer-facing
/// quantities are derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub time: DateTime<Utc>,
    /// Julian date (UTC) of `time`
    pub julian: f64,
    pub eci: EciState,
}

impl Snapshot {
    /// Geodetic sub-satellite point.
    pub fn ground_track(&self) -> GroundTrack {
        geometry::ground_track(&self.eci.position, self.julian)
    }

    /// Look angles from a ground station.
    pub fn topocentric(&self, station: &GroundStation) -> LookAngles {
        geometry::look_angles(&self.eci, station, self.julian)
    }

    /// Signed eclipse depth (rad) and the eclipsed flag.
    pub fn eclipse(&self) -> (f64, bool) {
        let sun = sun::sun_vector(self.julian);
        let depth = sun::eclipse_depth(&self.eci.position, &sun);
        (depth, depth >= 0.0)
    }

    /// Assemble a [`SatelliteState`]; look angles are filled only when a
    /// station is given.
    pub fn to_state(&self, station: Option<&GroundStation>) -> SatelliteState {
        let track = self.ground_track();
        let (eclipse_depth, eclipsed) = self.eclipse();
        let topocentric = station.map(|gs| {
            let look = self.topocentric(gs);
            Topocentric {
                azimuth: look.azimuth,
                elevation: look.elevation,
                range: look.range,
                range_rate: look.range_rate,
                above_horizon: look.above_horizon,
                local_sidereal_angle: look.local_sidereal_angle,
            }
        });

        SatelliteState {
            time: self.time,
            latitude: track.latitude,
            longitude: track.longitude,
            altitude: track.altitude,
            phase: self.eci.phase,
            theta: track.theta,
            eclipse_depth,
            eclipsed,
            converged: self.eci.converged,
            topocentric,
        }
    }
}

pub(crate) fn norm(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub(crate) fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::fixtures::*;
    use approx::assert_relative_eq;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn ao51() -> Propagator {
        Propagator::new(OrbitalElements::new(crate::elements::fixtures::ao51()).unwrap()).unwrap()
    }

    fn station() -> GroundStation {
        GroundStation::new(52.4670, -2.022, 200.0)
    }

    #[test]
    fn test_ao51_position_regression() {
        let prop = ao51();
        assert!(!prop.is_deep_space());
        let state = prop.position(&station(), at("2009-04-17T06:57:32Z"));
        let topo = state.topocentric.unwrap();

        assert_relative_eq!(topo.azimuth, 3.2421950, epsilon = 1e-3);
        assert_relative_eq!(topo.elevation, 0.1511580, epsilon = 1e-3);
        assert_relative_eq!(state.longitude, 6.2069835, epsilon = 1e-3);
        assert_relative_eq!(state.latitude, 0.5648232, epsilon = 1e-3);
        assert_relative_eq!(state.altitude, 818.1375014, epsilon = 0.05);
        assert_relative_eq!(state.phase, 3.4337605, epsilon = 1e-3);
        assert_relative_eq!(topo.range, 2506.0980852661323, epsilon = 0.5);
        assert_relative_eq!(topo.range_rate, 6.4832408, epsilon = 1e-2);
        assert_relative_eq!(state.theta, -0.9501914, epsilon = 1e-3);
        assert_relative_eq!(state.eclipse_depth, -0.7307717, epsilon = 1e-3);
        assert!(!state.eclipsed);
        assert!(topo.above_horizon);
        assert!(state.converged);
        assert!(prop.will_be_seen(&station()));
    }

    /// (azimuth, elevation, longitude, latitude, altitude, phase, range, range rate, theta, eclipse depth)
    fn assert_position(raw: crate::elements::ElementSet, time: &str, expected: [f64; 10]) {
        let prop = Propagator::new(OrbitalElements::new(raw).unwrap()).unwrap();
        let state = prop.position(&station(), at(time));
        let topo = state.topocentric.unwrap();
        let actual = [
            topo.azimuth,
            topo.elevation,
            state.longitude,
            state.latitude,
            state.altitude,
            state.phase,
            topo.range,
            topo.range_rate,
            state.theta,
            state.eclipse_depth,
        ];
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, e, epsilon = 1e-5, max_relative = 1e-7);
        }
        assert!(state.converged);
        assert!(!state.eclipsed);
    }

    #[test]
    fn test_deep_space_position_regression() {
        assert_position(
            ao40(),
            "2009-04-17T10:10:52Z",
            [
                6.056011393, -0.698943249, 3.301434722, 0.098574588, 24938.303604056,
                5.216299514, 35047.548022214, -2.439824326, -3.009854745, -0.221703533,
            ],
        );
        assert_position(
            geo(),
            "2009-12-26T00:00:00Z",
            [
                1.677496589, -0.054574434, 1.391724456, 0.011722115, 35789.353293846,
                3.126880759, 42030.762987269, 0.000678876, 3.043220329, -1.253217509,
            ],
        );
        assert_position(
            molniya(),
            "2009-12-26T00:00:00Z",
            [
                2.273928332, -0.644287667, 0.991630048, -0.482153161, 3263.009648881,
                0.14594333, 11990.546711037, 0.876271678, 2.643125921, -0.585634406,
            ],
        );
    }

    #[test]
    fn test_decaying_orbit_altitude_regression() {
        let el = OrbitalElements::new(decaying()).unwrap();
        let sec = Secular::new(&el);
        // Perigee of 133 km moves s to 55 km above the surface
        assert_relative_eq!((sec.s4 - AE) * XKMPER, 55.476921, epsilon = 1e-5);

        let prop = Propagator::new(el).unwrap();
        assert!(!prop.is_deep_space());
        let first = prop.position(&station(), at("2009-04-15T12:00:00Z"));
        let later = prop.position(&station(), at("2009-04-16T00:00:00Z"));
        assert_relative_eq!(first.altitude, 153.4093817, epsilon = 1e-5);
        assert_relative_eq!(later.altitude, 92.7607322, epsilon = 1e-5);
        assert!(later.eclipsed);
    }

    #[test]
    fn test_state_without_station() {
        let prop = ao51();
        let t = at("2009-04-17T06:57:32Z");
        let bare = prop.evaluate(t).to_state(None);
        let full = prop.position(&station(), t);
        assert!(bare.topocentric.is_none());
        assert!(!bare.above_horizon());
        assert_eq!(bare.latitude, full.latitude);
        assert_eq!(bare.longitude, full.longitude);
        assert_eq!(bare.altitude, full.altitude);
        assert_eq!(bare.eclipse_depth, full.eclipse_depth);
        assert_eq!(bare.time, t);
    }

    #[test]
    fn test_evaluation_is_pure() {
        let prop = ao51();
        let t = at("2009-01-05T07:43:00Z");
        let first = prop.position(&station(), t);
        // Interleave an unrelated evaluation far from t
        let _ = prop.position(&station(), at("2012-06-01T00:00:00Z"));
        let second = prop.position(&station(), t);
        assert_eq!(first, second);
    }

    #[test]
    fn test_epoch_state_is_sane() {
        let prop = ao51();
        let s = prop.propagate(0.0);
        let r = s.radius();
        assert!(r > XKMPER + 650.0 && r < XKMPER + 900.0, "r={r}");
        // LEO speed ~7.5 km/s
        let v = norm(&s.velocity);
        assert!(v > 7.0 && v < 8.0, "v={v}");
        assert!(s.converged);
    }

    #[test]
    fn test_kepler_circular() {
        // Zero eccentricity: E = U
        let k = solve_kepler(1.2, 0.0, 0.0);
        assert!(k.converged);
        assert_relative_eq!(k.sinepw, 1.2_f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(k.ecose, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_kepler_eccentric_satisfies_equation() {
        let (capu, axn, ayn) = (2.0, 0.3, 0.2);
        let k = solve_kepler(capu, axn, ayn);
        assert!(k.converged);
        let e = k.sinepw.atan2(k.cosepw);
        let residual = e - axn * k.sinepw + ayn * k.cosepw - capu;
        assert!(residual.abs() < 1e-5, "residual={residual}");
    }

    #[test]
    fn test_kepler_near_parabolic_stays_finite() {
        let k = solve_kepler(0.001, 0.999_999, 0.0);
        assert!(k.sinepw.is_finite() && k.cosepw.is_finite());
        assert!(k.ecose.is_finite() && k.esine.is_finite());
    }

    #[test]
    fn test_will_be_seen_polar_station() {
        let geo = OrbitalElements::new(geo()).unwrap();
        // Footprint of a GEO reaches ~81° latitude
        assert!(will_be_seen(&geo, &GroundStation::new(52.0, 0.0, 0.0)));
        assert!(!will_be_seen(&geo, &GroundStation::new(85.0, 0.0, 0.0)));
        assert!(!will_be_seen(&geo, &GroundStation::new(-85.0, 0.0, 0.0)));
    }

    #[test]
    fn test_variant_selection() {
        let near = ao51();
        assert!(!near.is_deep_space());
        let deep = Propagator::new(OrbitalElements::new(ao40()).unwrap()).unwrap();
        assert!(deep.is_deep_space());
    }
}
