pub mod types;

pub use types::{PositionFrame, PositionRecord, SatelliteIdentity};
