//! # satpass
//!
//! SGP4/SDP4 satellite propagation and ground-station pass prediction.
//!
//! Given a validated element set and an observer, the crate computes the
//! satellite's inertial state, sub-satellite point, look angles, sunlight
//! state and Doppler shift, and searches forward in time for passes
//! (AOS, LOS, peak elevation and whether the track crossed due north or
//! due south of the station).
//!
//! ```no_run
//! use satpass::{ElementSet, GroundStation, OrbitalElements, PassPredictor};
//! # fn run(raw: ElementSet) -> Result<(), satpass::PredictError> {
//! let station = GroundStation::new(52.467, -2.022, 200.0);
//! let mut predictor = PassPredictor::new(OrbitalElements::new(raw)?, station)?;
//! for pass in predictor.passes(chrono::Utc::now(), 24, true)? {
//!     println!("{pass}\n");
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod time;
pub mod error;
pub mod elements;
pub mod station;
pub mod state;
pub mod propagator;
mod near_earth;
mod deep_space;
pub mod geometry;
pub mod sun;
pub mod pass;

pub use elements::{ElementSet, OrbitalElements};
pub use error::PredictError;
pub use pass::{predict_all, PassPredictor, PolePassed, SatPass, SearchConfig};
pub use propagator::{will_be_seen, EciState, Propagator, Snapshot};
pub use state::{range_circle, SatelliteState, Topocentric};
pub use station::{GroundStation, HorizonMask};

#[cfg(feature = "python")]
mod pybridge;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn satpass(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pybridge::register(m)?;
    Ok(())
}
