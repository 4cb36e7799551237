//! Pass prediction: AOS/LOS search, pole-crossing classification and Doppler.
//!
//! The search walks forward from a start instant in fixed steps (coarse
//! steps to find the rise, fine steps to pin down AOS and LOS) exactly as the
//! PREDICT family of trackers does, so results land on a 5 second grid
//! anchored at the start instant.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use log::{debug, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::elements::OrbitalElements;
use crate::error::PredictError;
use crate::propagator::Propagator;
use crate::state::{SatelliteState, Topocentric};
use crate::station::GroundStation;

// ── Pass record ──

/// Whether a pass crossed due north or due south of the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolePassed {
    #[default]
    None,
    North,
    South,
}

impl PolePassed {
    /// Classify the azimuth change between two consecutive samples (degrees).
    pub fn classify(az1: f64, az2: f64) -> Self {
        if az1 > az2 {
            // Through north from 350° or more
            if az1 > 350.0 && az2 < 10.0 {
                return PolePassed::North;
            }
            if az1 > 180.0 && az2 < 180.0 {
                return PolePassed::South;
            }
        } else {
            if az1 < 10.0 && az2 > 350.0 {
                return PolePassed::North;
            }
            if az1 < 180.0 && az2 > 180.0 {
                return PolePassed::South;
            }
        }
        PolePassed::None
    }
}

impl fmt::Display for PolePassed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolePassed::None => "none",
            PolePassed::North => "north",
            PolePassed::South => "south",
        })
    }
}

/// One pass of a satellite over a ground station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatPass {
    /// Acquisition of signal
    pub aos: DateTime<Utc>,
    /// Loss of signal
    pub los: DateTime<Utc>,
    /// Time of closest approach (highest above-horizon sample within the pass)
    pub tca: Option<DateTime<Utc>>,
    pub pole_passed: PolePassed,
    /// Azimuth at AOS, truncated to whole degrees
    pub aos_azimuth: i32,
    /// Azimuth at LOS, truncated to whole degrees
    pub los_azimuth: i32,
    /// Peak elevation (degrees)
    pub max_elevation: f64,
}

impl SatPass {
    pub fn duration(&self) -> Duration {
        self.los - self.aos
    }

    /// TCA, or AOS when no sample within the pass had a positive elevation.
    pub fn tca_or_aos(&self) -> DateTime<Utc> {
        self.tca.unwrap_or(self.aos)
    }
}

impl fmt::Display for SatPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.duration().num_milliseconds() as f64 / 60_000.0;
        writeln!(f, "Date: {}", self.aos.format("%B %-d, %Y"))?;
        writeln!(f, "Start Time: {}", self.aos.format("%-I:%M %p"))?;
        writeln!(f, "Duration: {minutes:4.1} min.")?;
        writeln!(f, "AOS Azimuth: {} deg.", self.aos_azimuth)?;
        writeln!(f, "Max Elevation: {:4.1} deg.", self.max_elevation)?;
        write!(f, "LOS Azimuth: {} deg.", self.los_azimuth)
    }
}

// ── Configuration ──

/// Step sizes and limits for the pass search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Step while looking for the next rise (seconds).
    pub coarse_step_secs: i64,
    /// Step while the satellite is up (seconds).
    pub pass_step_secs: i64,
    /// Step used to refine AOS and LOS (seconds).
    pub fine_step_secs: i64,
    /// Give up on a single search after this many minutes of simulated time.
    pub max_search_minutes: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            coarse_step_secs: 60,
            pass_step_secs: 30,
            fine_step_secs: 5,
            max_search_minutes: 14 * 1440,
        }
    }
}

impl SearchConfig {
    fn validate(&self) -> Result<(), PredictError> {
        for step in [self.coarse_step_secs, self.pass_step_secs, self.fine_step_secs] {
            if step <= 0 {
                return Err(PredictError::InvalidStep(step));
            }
        }
        // Refinement has to land on the coarse and pass grids
        if self.coarse_step_secs % self.fine_step_secs != 0
            || self.pass_step_secs % self.fine_step_secs != 0
        {
            return Err(PredictError::MisalignedStep {
                fine: self.fine_step_secs,
                coarse: self.coarse_step_secs,
                pass: self.pass_step_secs,
            });
        }
        Ok(())
    }
}

// ── Predictor ──

/// Running maximum elevation and when it was seen. Only samples that clear
/// the horizon mask count.
struct Peak {
    elevation: f64,
    time: Option<DateTime<Utc>>,
}

impl Peak {
    fn update(&mut self, look: &Topocentric, time: DateTime<Utc>) {
        if look.above_horizon && look.elevation > self.elevation {
            self.elevation = look.elevation;
            self.time = Some(time);
        }
    }
}

/// Predicts passes of one satellite over one ground station.
#[derive(Debug, Clone)]
pub struct PassPredictor {
    propagator: Propagator,
    station: GroundStation,
    config: SearchConfig,
    iterations: usize,
    non_converged: usize,
}

impl PassPredictor {
    /// Fails with [`PredictError::SatelliteNotVisible`] when the orbit can
    /// never rise above the station's horizon.
    pub fn new(elements: OrbitalElements, station: GroundStation) -> Result<Self, PredictError> {
        let propagator = Self::visible_propagator(elements, &station)?;
        Ok(PassPredictor {
            propagator,
            station,
            config: SearchConfig::default(),
            iterations: 0,
            non_converged: 0,
        })
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    fn visible_propagator(
        elements: OrbitalElements,
        station: &GroundStation,
    ) -> Result<Propagator, PredictError> {
        let propagator = Propagator::new(elements)?;
        if !propagator.will_be_seen(station) {
            return Err(PredictError::SatelliteNotVisible {
                catalog_number: propagator.elements().catalog_number(),
                latitude: station.latitude,
            });
        }
        Ok(propagator)
    }

    /// Swap in a new element set. The current one is kept if the new set is
    /// invalid or never visible.
    pub fn set_elements(&mut self, elements: OrbitalElements) -> Result<(), PredictError> {
        self.propagator = Self::visible_propagator(elements, &self.station)?;
        Ok(())
    }

    pub fn propagator(&self) -> &Propagator {
        &self.propagator
    }

    pub fn station(&self) -> &GroundStation {
        &self.station
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Evaluations since construction or the last [`passes`](Self::passes).
    pub fn iteration_count(&self) -> usize {
        self.iterations
    }

    /// Evaluations whose Kepler or resonance solver stopped at its cap.
    pub fn non_converged_count(&self) -> usize {
        self.non_converged
    }

    fn evaluate(&mut self, time: DateTime<Utc>) -> SatelliteState {
        self.iterations += 1;
        let state = self.propagator.position(&self.station, time);
        if !state.converged {
            self.non_converged += 1;
            warn!(
                "Satellite {}: solver did not converge at {time}",
                self.propagator.elements().catalog_number()
            );
        }
        state
    }

    fn look(&mut self, time: DateTime<Utc>) -> Result<Topocentric, PredictError> {
        self.evaluate(time)
            .topocentric
            .filter(|t| t.elevation.is_finite())
            .ok_or(PredictError::NonFiniteElevation { time })
    }

    fn quarter_orbit_minutes(&self) -> i64 {
        (XMNPDA / self.propagator.elements().mean_motion() / 4.0) as i64
    }

    fn three_quarter_orbit_minutes(&self) -> i64 {
        (XMNPDA / self.propagator.elements().mean_motion() * 0.75) as i64
    }

    fn check_budget(&self, origin: DateTime<Utc>, time: DateTime<Utc>) -> Result<(), PredictError> {
        let limit = self.config.max_search_minutes;
        if (time - origin).num_minutes() > limit {
            return Err(PredictError::SearchExhausted { start: origin, minutes: limit });
        }
        Ok(())
    }

    /// Find the next pass starting at `start`. With `wind_back` the search
    /// begins a quarter orbit earlier so a pass already in progress is
    /// reported from its AOS.
    pub fn next_pass(&mut self, start: DateTime<Utc>, wind_back: bool) -> Result<SatPass, PredictError> {
        self.config.validate()?;
        let coarse = Duration::seconds(self.config.coarse_step_secs);
        let during = Duration::seconds(self.config.pass_step_secs);
        let fine = Duration::seconds(self.config.fine_step_secs);

        let mut t = start;
        if wind_back {
            t -= Duration::minutes(self.quarter_orbit_minutes());
        }
        let origin = t;

        // Already up: wait for it to set, then skip most of an orbit
        let mut look = self.look(t)?;
        if look.above_horizon {
            loop {
                t += coarse;
                self.check_budget(origin, t)?;
                look = self.look(t)?;
                if !look.above_horizon {
                    break;
                }
            }
            t += Duration::minutes(self.three_quarter_orbit_minutes());
        }

        loop {
            t += coarse;
            self.check_budget(origin, t)?;
            look = self.look(t)?;
            if look.above_horizon {
                break;
            }
        }
        let rise = (t, look);

        t -= coarse;
        loop {
            t += fine;
            look = self.look(t)?;
            if look.above_horizon {
                break;
            }
        }
        let aos = t;
        let mut peak = Peak { elevation: 0.0, time: None };
        peak.update(&look, t);
        let aos_azimuth = (look.azimuth * RAD2DEG) as i32;

        let mut pole_passed = PolePassed::None;
        let mut prev = look;
        loop {
            t += during;
            self.check_budget(origin, t)?;
            look = self.look(t)?;
            let crossing = PolePassed::classify(prev.azimuth * RAD2DEG, look.azimuth * RAD2DEG);
            if crossing != PolePassed::None {
                trace!("Pole crossing {crossing} at {t}");
                pole_passed = crossing;
            }
            peak.update(&look, t);
            prev = look;
            if !look.above_horizon {
                break;
            }
        }

        t -= during;
        loop {
            t += fine;
            look = self.look(t)?;
            peak.update(&look, t);
            if !look.above_horizon {
                break;
            }
        }

        let los = t;
        if rise.0 >= aos && rise.0 < los {
            peak.update(&rise.1, rise.0);
        }

        let pass = SatPass {
            aos,
            los,
            tca: peak.time,
            pole_passed,
            aos_azimuth,
            los_azimuth: (look.azimuth * RAD2DEG) as i32,
            max_elevation: peak.elevation * RAD2DEG,
        };
        debug!(
            "Satellite {}: pass {} to {}, max elevation {:.1}°",
            self.propagator.elements().catalog_number(),
            pass.aos,
            pass.los,
            pass.max_elevation
        );
        Ok(pass)
    }

    /// All passes whose AOS falls before `start + hours_ahead`, plus the first
    /// one after. Resets the evaluation counters.
    pub fn passes(
        &mut self,
        start: DateTime<Utc>,
        hours_ahead: u32,
        wind_back: bool,
    ) -> Result<Vec<SatPass>, PredictError> {
        self.iterations = 0;
        self.non_converged = 0;

        let end = start + Duration::hours(i64::from(hours_ahead));
        let mut passes = Vec::new();
        let mut search_from = start;
        let mut first = true;

        loop {
            let pass = self.next_pass(search_from, wind_back && first)?;
            first = false;
            search_from = pass.los + Duration::minutes(self.three_quarter_orbit_minutes());
            let last_aos = pass.aos;
            passes.push(pass);
            if last_aos >= end {
                break;
            }
        }

        Ok(passes)
    }

    /// Satellite track sampled every `increment_secs` from `minutes_before`
    /// before `reference` up to (not including) `minutes_after` after it.
    pub fn positions(
        &mut self,
        reference: DateTime<Utc>,
        increment_secs: i64,
        minutes_before: u32,
        minutes_after: u32,
    ) -> Result<Vec<SatelliteState>, PredictError> {
        if increment_secs <= 0 {
            return Err(PredictError::InvalidStep(increment_secs));
        }
        let step = Duration::seconds(increment_secs);
        let mut t = reference - Duration::minutes(i64::from(minutes_before));
        let end = reference + Duration::minutes(i64::from(minutes_after));

        let mut positions = Vec::new();
        while t < end {
            positions.push(self.evaluate(t));
            t += step;
        }
        Ok(positions)
    }

    /// Received frequency (Hz) for a downlink transmitted at `hz`.
    pub fn downlink_frequency(&mut self, hz: i64, time: DateTime<Utc>) -> Result<i64, PredictError> {
        let range_rate = self.look(time)?.range_rate;
        Ok((hz as f64 * (SPEED_OF_LIGHT - range_rate * 1000.0) / SPEED_OF_LIGHT) as i64)
    }

    /// Frequency (Hz) to transmit so the satellite receives `hz`.
    pub fn uplink_frequency(&mut self, hz: i64, time: DateTime<Utc>) -> Result<i64, PredictError> {
        let range_rate = self.look(time)?.range_rate;
        Ok((hz as f64 * (SPEED_OF_LIGHT + range_rate * 1000.0) / SPEED_OF_LIGHT) as i64)
    }
}

/// Predict passes for many satellites over one station in parallel.
///
/// Results are in input order; each satellite fails or succeeds on its own.
pub fn predict_all(
    element_sets: &[OrbitalElements],
    station: &GroundStation,
    config: &SearchConfig,
    start: DateTime<Utc>,
    hours_ahead: u32,
    wind_back: bool,
) -> Vec<Result<Vec<SatPass>, PredictError>> {
    element_sets
        .par_iter()
        .map(|elements| {
            let mut predictor = PassPredictor::new(elements.clone(), station.clone())?
                .with_config(config.clone());
            predictor.passes(start, hours_ahead, wind_back)
        })
        .collect()
}
