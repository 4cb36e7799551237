//! Python bindings via PyO3 for satpass.
//!
//! Instants cross the boundary as UNIX seconds (UTC).
use chrono::{DateTime, Utc};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::constants;
use crate::elements::{ElementSet, OrbitalElements};
use crate::error::PredictError;
use crate::pass::{self, SatPass, SearchConfig};
use crate::state::SatelliteState;
use crate::station;
use crate::time;

fn to_py_err(e: PredictError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn instant(unix_secs: f64) -> PyResult<DateTime<Utc>> {
    time::from_unix_seconds(unix_secs)
        .ok_or_else(|| PyValueError::new_err(format!("Invalid timestamp: {unix_secs}")))
}

fn unix(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64 / 1000.0
}

// Elements
#[pyclass(name = "Elements")]
#[derive(Clone)]
pub struct PyElements {
    pub(crate) inner: OrbitalElements,
}

#[pymethods]
impl PyElements {
    #[new]
    #[pyo3(signature = (
        catalog_number, epoch_year, epoch_day, inclination_deg, raan_deg, eccentricity,
        arg_perigee_deg, mean_anomaly_deg, mean_motion, bstar=0.0, name=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        catalog_number: u32,
        epoch_year: i32,
        epoch_day: f64,
        inclination_deg: f64,
        raan_deg: f64,
        eccentricity: f64,
        arg_perigee_deg: f64,
        mean_anomaly_deg: f64,
        mean_motion: f64,
        bstar: f64,
        name: Option<String>,
    ) -> PyResult<Self> {
        let raw = ElementSet {
            name,
            catalog_number,
            epoch_year,
            epoch_day,
            inclination_deg,
            raan_deg,
            eccentricity,
            arg_perigee_deg,
            mean_anomaly_deg,
            mean_motion,
            mean_motion_dot: 0.0,
            mean_motion_ddot: 0.0,
            bstar,
            orbit_number: 0,
            element_set: 0,
        };
        let inner = OrbitalElements::new(raw).map_err(to_py_err)?;
        Ok(PyElements { inner })
    }

    #[getter] fn catalog_number(&self) -> u32 { self.inner.catalog_number() }
    #[getter] fn name(&self) -> Option<String> { self.inner.name().map(str::to_owned) }
    #[getter] fn period_minutes(&self) -> f64 { self.inner.period_minutes() }
    #[getter] fn apogee_km(&self) -> f64 { self.inner.apogee_km() }
    #[getter] fn perigee_km(&self) -> f64 { self.inner.perigee_km() }
    #[getter] fn is_deep_space(&self) -> bool { self.inner.is_deep_space() }

    fn __repr__(&self) -> String {
        format!(
            "Elements(#{}, period={:.2} min, perigee={:.1} km, apogee={:.1} km)",
            self.inner.catalog_number(),
            self.inner.period_minutes(),
            self.inner.perigee_km(),
            self.inner.apogee_km(),
        )
    }
}

// Ground station
#[pyclass(name = "GroundStation")]
#[derive(Clone)]
pub struct PyGroundStation {
    inner: station::GroundStation,
}

#[pymethods]
impl PyGroundStation {
    /// Args:
    ///     latitude: degrees north
    ///     longitude: degrees east
    ///     altitude: metres above sea level
    ///     horizon: optional 36 minimum elevations (deg), one per 10° of azimuth
    #[new]
    #[pyo3(signature = (latitude, longitude, altitude=0.0, horizon=None))]
    fn new(latitude: f64, longitude: f64, altitude: f64, horizon: Option<Vec<f64>>) -> PyResult<Self> {
        let mut inner = station::GroundStation::new(latitude, longitude, altitude);
        if let Some(mask) = horizon {
            inner = inner.with_horizon_mask(&mask).map_err(to_py_err)?;
        }
        Ok(PyGroundStation { inner })
    }

    #[getter] fn latitude(&self) -> f64 { self.inner.latitude }
    #[getter] fn longitude(&self) -> f64 { self.inner.longitude }
    #[getter] fn altitude(&self) -> f64 { self.inner.altitude }
    #[getter] fn horizon(&self) -> Vec<f64> { self.inner.horizon.into() }
}

fn pass_to_tuple(p: &SatPass) -> (f64, f64, f64, String, i32, i32, f64) {
    (
        unix(p.aos),
        unix(p.los),
        unix(p.tca_or_aos()),
        p.pole_passed.to_string(),
        p.aos_azimuth,
        p.los_azimuth,
        p.max_elevation,
    )
}

/// [t, lat_deg, lon_deg, alt_km, az_deg, el_deg, range_km, range_rate_km_s, eclipsed]
fn state_to_vec(s: &SatelliteState) -> Vec<f64> {
    let topo = s.topocentric;
    vec![
        unix(s.time),
        s.latitude * constants::RAD2DEG,
        s.longitude * constants::RAD2DEG,
        s.altitude,
        topo.map_or(f64::NAN, |t| t.azimuth * constants::RAD2DEG),
        topo.map_or(f64::NAN, |t| t.elevation * constants::RAD2DEG),
        topo.map_or(f64::NAN, |t| t.range),
        topo.map_or(f64::NAN, |t| t.range_rate),
        if s.eclipsed { 1.0 } else { 0.0 },
    ]
}

// Pass predictor
#[pyclass(name = "PassPredictor")]
pub struct PyPassPredictor {
    inner: pass::PassPredictor,
}

#[pymethods]
impl PyPassPredictor {
    #[new]
    #[pyo3(signature = (elements, station, coarse_step_secs=60, pass_step_secs=30, fine_step_secs=5))]
    fn new(
        elements: &PyElements,
        station: &PyGroundStation,
        coarse_step_secs: i64,
        pass_step_secs: i64,
        fine_step_secs: i64,
    ) -> PyResult<Self> {
        let config = SearchConfig {
            coarse_step_secs,
            pass_step_secs,
            fine_step_secs,
            ..SearchConfig::default()
        };
        let inner = pass::PassPredictor::new(elements.inner.clone(), station.inner.clone())
            .map_err(to_py_err)?
            .with_config(config);
        Ok(PyPassPredictor { inner })
    }

    /// Next pass as (aos, los, tca, pole, aos_az, los_az, max_el).
    #[pyo3(signature = (start, wind_back=false))]
    fn next_pass(&mut self, start: f64, wind_back: bool) -> PyResult<(f64, f64, f64, String, i32, i32, f64)> {
        let p = self.inner.next_pass(instant(start)?, wind_back).map_err(to_py_err)?;
        Ok(pass_to_tuple(&p))
    }

    #[pyo3(signature = (start, hours, wind_back=false))]
    fn passes(&mut self, start: f64, hours: u32, wind_back: bool) -> PyResult<Vec<(f64, f64, f64, String, i32, i32, f64)>> {
        let passes = self.inner.passes(instant(start)?, hours, wind_back).map_err(to_py_err)?;
        Ok(passes.iter().map(pass_to_tuple).collect())
    }

    /// Returns list of [t, lat, lon, alt, az, el, range, range_rate, eclipsed].
    fn positions(&mut self, reference: f64, increment_secs: i64, minutes_before: u32, minutes_after: u32) -> PyResult<Vec<Vec<f64>>> {
        let states = self
            .inner
            .positions(instant(reference)?, increment_secs, minutes_before, minutes_after)
            .map_err(to_py_err)?;
        Ok(states.iter().map(state_to_vec).collect())
    }

    fn downlink_frequency(&mut self, hz: i64, time: f64) -> PyResult<i64> {
        self.inner.downlink_frequency(hz, instant(time)?).map_err(to_py_err)
    }

    fn uplink_frequency(&mut self, hz: i64, time: f64) -> PyResult<i64> {
        self.inner.uplink_frequency(hz, instant(time)?).map_err(to_py_err)
    }

    #[getter] fn iteration_count(&self) -> usize { self.inner.iteration_count() }
    #[getter] fn non_converged_count(&self) -> usize { self.inner.non_converged_count() }
}

// Free functions
#[pyfunction]
fn range_circle(lat_deg: f64, lon_deg: f64, altitude_km: f64) -> Vec<[f64; 2]> {
    crate::state::range_circle(lat_deg * constants::DEG2RAD, lon_deg * constants::DEG2RAD, altitude_km)
}

/// Pass lists for many satellites, computed in parallel. Raises ValueError
/// with the first failure in input order.
#[pyfunction]
#[pyo3(signature = (elements, station, start, hours, wind_back=false))]
fn predict_all(
    py: Python<'_>,
    elements: Vec<PyElements>,
    station: &PyGroundStation,
    start: f64,
    hours: u32,
    wind_back: bool,
) -> PyResult<Vec<Vec<(f64, f64, f64, String, i32, i32, f64)>>> {
    let start = instant(start)?;
    let sets: Vec<OrbitalElements> = elements.into_iter().map(|e| e.inner).collect();
    let gs = station.inner.clone();
    let results = py.allow_threads(|| pass::predict_all(&sets, &gs, &SearchConfig::default(), start, hours, wind_back));
    results
        .into_iter()
        .map(|r| {
            r.map(|passes| passes.iter().map(pass_to_tuple).collect())
                .map_err(to_py_err)
        })
        .collect()
}

// Module registration
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyElements>()?;
    m.add_class::<PyGroundStation>()?;
    m.add_class::<PyPassPredictor>()?;
    m.add_function(wrap_pyfunction!(range_circle, m)?)?;
    m.add_function(wrap_pyfunction!(predict_all, m)?)?;
    Ok(())
}
