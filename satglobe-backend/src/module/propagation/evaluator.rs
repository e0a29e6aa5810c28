///! Position evaluator
///!
///! Propagates one catalog entry to one instant and converts the TEME
///! output to longitude/latitude in degrees and altitude in meters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::frames::{ecef_to_geodetic, gmst, teme_to_ecef};
use crate::module::catalog::SatelliteEntry;

/// SGP4 reports positions in kilometers
pub const METERS_PER_KILOMETER: f64 = 1000.0;

/// Geodetic position of one satellite at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Degrees, (-180, 180]
    pub longitude: f64,
    /// Degrees, [-90, 90]
    pub latitude: f64,
    /// Meters above the WGS-84 ellipsoid
    pub altitude: f64,
}

impl PositionSample {
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite() && self.altitude.is_finite()
    }
}

/// Why an entry has no position at an instant
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalFailure {
    #[error("elements are {age_days:.1} days from epoch (limit {limit_days:.1})")]
    StaleElements { age_days: f64, limit_days: f64 },

    /// SGP4 numerical condition: decay, diverging eccentricity, degenerate ellipse
    #[error("propagation error: {0}")]
    Propagation(String),

    #[error("satellite below the ellipsoid ({altitude_km:.1} km)")]
    Decayed { altitude_km: f64 },

    #[error("non-finite coordinate in result")]
    NonFinite,
}

/// Tunables for evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorOptions {
    /// Refuse to propagate further than this from the element epoch
    #[serde(default)]
    pub max_element_age_days: Option<f64>,
}

/// Compute the geodetic position of `entry` at `instant`.
///
/// Failures are logged against the entry's identity and returned; they
/// never concern any other entry.
pub fn evaluate(
    entry: &SatelliteEntry,
    instant: DateTime<Utc>,
    options: &EvaluatorOptions,
) -> Result<PositionSample, EvalFailure> {
    let result = evaluate_state(entry, instant, options);
    if let Err(e) = &result {
        warn!("Propagation failed for {}: {}", entry.identity(), e);
    }
    result
}

fn evaluate_state(
    entry: &SatelliteEntry,
    instant: DateTime<Utc>,
    options: &EvaluatorOptions,
) -> Result<PositionSample, EvalFailure> {
    let state = entry.state();

    if let Some(limit_days) = options.max_element_age_days {
        let age_days = state.age_days(instant)?;
        if age_days > limit_days {
            return Err(EvalFailure::StaleElements {
                age_days,
                limit_days,
            });
        }
    }

    let prediction = state.propagate(instant)?;

    teme_to_sample(prediction.position, instant)
}

/// TEME position (km) at `instant` to a validated sample
pub fn teme_to_sample(
    position_km: [f64; 3],
    instant: DateTime<Utc>,
) -> Result<PositionSample, EvalFailure> {
    if position_km.iter().any(|c| !c.is_finite()) {
        return Err(EvalFailure::NonFinite);
    }

    let geodetic = ecef_to_geodetic(teme_to_ecef(position_km, gmst(instant)));

    let sample = PositionSample {
        longitude: geodetic.longitude.to_degrees(),
        latitude: geodetic.latitude.to_degrees(),
        altitude: geodetic.height_km * METERS_PER_KILOMETER,
    };

    if !sample.is_finite() {
        return Err(EvalFailure::NonFinite);
    }
    if geodetic.height_km < 0.0 {
        return Err(EvalFailure::Decayed {
            altitude_km: geodetic.height_km,
        });
    }

    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::catalog::{ColumnMap, RawRecord, ValidatedRecord, build_entry};
    use chrono::Duration;

    // Vallado SGP4 verification case, catalog 00005
    const LINE1: &str = "1 00005U 58002B   00179.78495062  .00000023  00000-0  28098-4 0  4753";
    const LINE2: &str = "2 00005  34.2682 348.7242 1859667 331.7664  19.3264 10.82419157413667";

    fn entry() -> SatelliteEntry {
        let raw = RawRecord::from_pairs([
            ("OBJECT_NAME", "VANGUARD 1"),
            ("NORAD_CAT_ID", "5"),
            ("TLE_LINE1", LINE1),
            ("TLE_LINE2", LINE2),
        ]);
        let record = ValidatedRecord::from_raw(raw, &ColumnMap::default()).unwrap();
        build_entry(record).unwrap()
    }

    #[test]
    fn test_reference_teme_position_at_epoch() {
        let entry = entry();
        let prediction = entry.state().propagate(entry.state().epoch()).unwrap();

        let expected = [7022.465_292_66, -1400.082_967_55, 0.039_951_55];
        for (got, want) in prediction.position.iter().zip(expected) {
            assert!((got - want).abs() < 1e-3, "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_reference_geodetic_position_at_epoch() {
        let entry = entry();
        let sample = evaluate(&entry, entry.state().epoch(), &EvaluatorOptions::default()).unwrap();

        // sub-kilometer: 0.005° is ~0.6 km at this radius
        assert!((sample.longitude - 149.955_736).abs() < 0.005, "lon {}", sample.longitude);
        assert!(sample.latitude.abs() < 0.005, "lat {}", sample.latitude);
        // meters, not kilometers
        assert!((sample.altitude - 782_536.9).abs() < 1000.0, "alt {}", sample.altitude);
    }

    #[test]
    fn test_sample_bounds_over_an_orbit() {
        let entry = entry();
        let epoch = entry.state().epoch();
        let options = EvaluatorOptions::default();

        // period is ~133 minutes
        for minutes in (0..140).step_by(10) {
            let sample = evaluate(&entry, epoch + Duration::minutes(minutes), &options).unwrap();
            assert!(sample.longitude > -180.0 && sample.longitude <= 180.0);
            // inclination bounds the latitude
            assert!(sample.latitude.abs() <= 35.0);
            assert!(sample.altitude > 500_000.0 && sample.altitude < 4_500_000.0);
        }
    }

    #[test]
    fn test_stale_elements_rejected_when_limited() {
        let entry = entry();
        let options = EvaluatorOptions {
            max_element_age_days: Some(30.0),
        };
        let instant = entry.state().epoch() + Duration::days(365);

        let err = evaluate(&entry, instant, &options).unwrap_err();
        assert!(matches!(err, EvalFailure::StaleElements { .. }));

        assert!(evaluate(&entry, entry.state().epoch() + Duration::days(29), &options).is_ok());
    }

    #[test]
    fn test_non_finite_position_is_failure() {
        let instant = Utc::now();
        let err = teme_to_sample([f64::NAN, 0.0, 0.0], instant).unwrap_err();
        assert_eq!(err, EvalFailure::NonFinite);

        let err = teme_to_sample([7000.0, f64::INFINITY, 0.0], instant).unwrap_err();
        assert_eq!(err, EvalFailure::NonFinite);
    }

    #[test]
    fn test_position_inside_earth_is_decayed() {
        let err = teme_to_sample([3000.0, 0.0, 0.0], Utc::now()).unwrap_err();
        assert!(matches!(err, EvalFailure::Decayed { .. }));
    }
}
