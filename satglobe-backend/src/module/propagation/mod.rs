///! Orbit propagation module
///!
///! ## Main Components
///! - `OrbitalState`: SGP4 elements and constants for one element set
///! - `evaluate`: one entry at one instant to a geodetic `PositionSample`
///! - `compute_all`: a whole catalog snapshot at one instant

mod state;
pub use state::{InitFailure, OrbitalState, build_orbital_state};

pub mod frames;

mod evaluator;
pub use evaluator::{
    EvalFailure, EvaluatorOptions, METERS_PER_KILOMETER, PositionSample, evaluate, teme_to_sample,
};

mod batch;
pub use batch::{BatchOutcome, EvalFailureRecord, TrackedPosition, compute_all, compute_all_now};
