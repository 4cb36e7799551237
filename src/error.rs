//! Error taxonomy for element validation, visibility and pass searching.
//!
//! Kepler and resonance non-convergence is not an error: it is reported on
//! each state through its `converged` flag and counted by the pass predictor.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Prediction errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("Invalid orbital element '{field}' = {value}: {reason}")]
    InvalidOrbitalElements {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Satellite {catalog_number} never rises above the horizon at latitude {latitude}°")]
    SatelliteNotVisible { catalog_number: u32, latitude: f64 },

    #[error("Horizon mask must have 36 entries, got {0}")]
    InvalidHorizonMask(usize),

    #[error("Non-finite elevation at {time}")]
    NonFiniteElevation { time: DateTime<Utc> },

    #[error("No horizon crossing within {minutes} minutes of {start}")]
    SearchExhausted { start: DateTime<Utc>, minutes: i64 },

    #[error("Time step must be a positive number of seconds, got {0}")]
    InvalidStep(i64),

    #[error("Fine step of {fine} s must divide the coarse ({coarse} s) and pass ({pass} s) steps")]
    MisalignedStep { fine: i64, coarse: i64, pass: i64 },
}

impl PredictError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        PredictError::InvalidOrbitalElements { field, value, reason }
    }
}
