///! SGP4 orbital state built from a two-line element set

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::evaluator::EvalFailure;

/// Why an element set could not become an `OrbitalState`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitFailure {
    /// Bad checksum, field width, line number or unparsable field
    #[error("malformed element lines: {0}")]
    MalformedElements(String),

    /// Lines parsed but SGP4 rejected the elements
    #[error("invalid orbital elements: {0}")]
    InvalidElements(String),
}

/// Parsed mean elements plus the SGP4 constants derived from them.
///
/// Never modified after creation; a new element set means a new state.
pub struct OrbitalState {
    elements: sgp4::Elements,
    constants: sgp4::Constants,
}

impl std::fmt::Debug for OrbitalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrbitalState")
            .field("norad_id", &self.elements.norad_id)
            .field("epoch", &self.elements.datetime)
            .field("mean_motion", &self.elements.mean_motion)
            .finish_non_exhaustive()
    }
}

/// Parse both element lines and initialise the propagator
pub fn build_orbital_state(line1: &str, line2: &str) -> Result<OrbitalState, InitFailure> {
    let elements = sgp4::Elements::from_tle(None, line1.trim().as_bytes(), line2.trim().as_bytes())
        .map_err(|e| InitFailure::MalformedElements(format!("{:?}", e)))?;

    OrbitalState::from_elements(elements)
}

impl OrbitalState {
    /// Initialise the propagator from already parsed elements
    pub fn from_elements(elements: sgp4::Elements) -> Result<Self, InitFailure> {
        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| InitFailure::InvalidElements(format!("{:?}", e)))?;

        Ok(Self {
            elements,
            constants,
        })
    }

    pub fn elements(&self) -> &sgp4::Elements {
        &self.elements
    }

    /// Catalog number encoded in the element lines
    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }

    /// Element set epoch (UTC)
    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    /// Signed minutes between the element epoch and `instant`
    pub fn minutes_since_epoch(&self, instant: DateTime<Utc>) -> Result<f64, EvalFailure> {
        self.elements
            .datetime_to_minutes_since_epoch(&instant.naive_utc())
            .map(|minutes| minutes.0)
            .map_err(|e| EvalFailure::Propagation(format!("{:?}", e)))
    }

    /// Element age at `instant` in days, always positive
    pub fn age_days(&self, instant: DateTime<Utc>) -> Result<f64, EvalFailure> {
        Ok(self.minutes_since_epoch(instant)?.abs() / 1440.0)
    }

    /// TEME position (km) and velocity (km/s) at `instant`
    pub fn propagate(&self, instant: DateTime<Utc>) -> Result<sgp4::Prediction, EvalFailure> {
        let minutes = self.minutes_since_epoch(instant)?;
        self.constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|e| EvalFailure::Propagation(format!("{:?}", e)))
    }
}
