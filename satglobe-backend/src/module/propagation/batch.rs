///! Batch coordinator - evaluate a whole catalog snapshot at one instant

use chrono::{DateTime, Utc};
use satglobe_common::{PositionFrame, PositionRecord, SatelliteIdentity};
use tracing::debug;

use super::evaluator::{EvalFailure, EvaluatorOptions, PositionSample, evaluate};
use crate::module::catalog::{Catalog, SatelliteEntry};

/// An entry paired with its position at the batch instant
#[derive(Debug, Clone, Copy)]
pub struct TrackedPosition<'a> {
    pub entry: &'a SatelliteEntry,
    pub sample: PositionSample,
}

impl TrackedPosition<'_> {
    pub fn to_record(&self) -> PositionRecord {
        PositionRecord {
            identity: self.entry.identity().clone(),
            longitude: self.sample.longitude,
            latitude: self.sample.latitude,
            altitude: self.sample.altitude,
        }
    }
}

/// An entry that produced no position at the batch instant
#[derive(Debug, Clone)]
pub struct EvalFailureRecord {
    pub identity: SatelliteIdentity,
    pub failure: EvalFailure,
}

/// Everything one `compute_all` pass produced
#[derive(Debug)]
pub struct BatchOutcome<'a> {
    pub instant: DateTime<Utc>,
    /// Catalog order, failed entries omitted
    pub positions: Vec<TrackedPosition<'a>>,
    pub failures: Vec<EvalFailureRecord>,
}

impl BatchOutcome<'_> {
    /// Collaborator-facing copy of the positions
    pub fn to_frame(&self) -> PositionFrame {
        PositionFrame {
            instant: self.instant,
            positions: self.positions.iter().map(TrackedPosition::to_record).collect(),
        }
    }
}

/// Evaluate every entry of `catalog` at `instant`.
///
/// Never fails: entries whose evaluation fails are left out of
/// `positions` and listed in `failures`.
pub fn compute_all<'a>(
    catalog: &'a Catalog,
    instant: DateTime<Utc>,
    options: &EvaluatorOptions,
) -> BatchOutcome<'a> {
    let mut positions = Vec::with_capacity(catalog.len());
    let mut failures = Vec::new();

    for entry in catalog.entries() {
        match evaluate(entry, instant, options) {
            Ok(sample) => positions.push(TrackedPosition { entry, sample }),
            Err(failure) => failures.push(EvalFailureRecord {
                identity: entry.identity().clone(),
                failure,
            }),
        }
    }

    debug!(
        "Computed {} positions at {} ({} failed)",
        positions.len(),
        instant.format("%Y-%m-%d %H:%M:%S UTC"),
        failures.len()
    );

    BatchOutcome {
        instant,
        positions,
        failures,
    }
}

/// `compute_all` at the current UTC instant
pub fn compute_all_now<'a>(catalog: &'a Catalog, options: &EvaluatorOptions) -> BatchOutcome<'a> {
    compute_all(catalog, Utc::now(), options)
}
