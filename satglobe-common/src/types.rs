use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a tracked satellite as seen by renderers and detail views
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteIdentity {
    /// Display name (short name, object name, or synthesized)
    pub name: String,
    /// NORAD catalog number as text
    pub catalog_id: String,
    /// International designator (COSPAR id), when the catalog carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

impl SatelliteIdentity {
    pub fn new(name: impl Into<String>, catalog_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog_id: catalog_id.into(),
            object_id: None,
        }
    }
}

impl std::fmt::Display for SatelliteIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name, self.catalog_id)
    }
}

/// One satellite position handed to a rendering collaborator.
///
/// Longitude and latitude are in degrees, altitude in meters above the
/// WGS-84 ellipsoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub identity: SatelliteIdentity,
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

/// All positions computed for a single instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionFrame {
    pub instant: DateTime<Utc>,
    pub positions: Vec<PositionRecord>,
}

impl PositionFrame {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display() {
        let identity = SatelliteIdentity::new("ISS (ZARYA)", "25544");
        assert_eq!(identity.to_string(), "ISS (ZARYA) [25544]");
    }

    #[test]
    fn test_position_record_json_shape() {
        let record = PositionRecord {
            identity: SatelliteIdentity::new("ISS", "25544"),
            longitude: 12.5,
            latitude: -45.0,
            altitude: 420_000.0,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["identity"]["name"], "ISS");
        assert_eq!(value["identity"]["catalogId"], "25544");
        assert!(value["identity"].get("objectId").is_none());
        assert_eq!(value["altitude"], 420_000.0);
    }
}
