use satglobe_common::SatelliteIdentity;
use serde::{Deserialize, Serialize};

use crate::module::propagation::OrbitalState;

/// Column names used to resolve the fixed catalog schema.
///
/// Defaults follow the Celestrak GP CSV layout plus the merged
/// `TLE_LINE1`/`TLE_LINE2` and `N2YO_SAT_NAME` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub line1: String,
    pub line2: String,
    pub catalog_id: String,
    pub object_id: String,
    pub object_name: String,
    pub short_name: String,
    pub inclination: String,
    pub eccentricity: String,
    pub mean_motion: String,
    pub epoch: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            line1: "TLE_LINE1".to_string(),
            line2: "TLE_LINE2".to_string(),
            catalog_id: "NORAD_CAT_ID".to_string(),
            object_id: "OBJECT_ID".to_string(),
            object_name: "OBJECT_NAME".to_string(),
            short_name: "N2YO_SAT_NAME".to_string(),
            inclination: "INCLINATION".to_string(),
            eccentricity: "ECCENTRICITY".to_string(),
            mean_motion: "MEAN_MOTION".to_string(),
            epoch: "EPOCH".to_string(),
        }
    }
}

/// One catalog row: field name to value, in header order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of the first field called `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `name`, treating an empty string as absent
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy of this record with `name` set to `value`.
    ///
    /// Replaces the existing field in place, or appends it when the header
    /// had no such column.
    pub fn with_field(&self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut fields = self.fields.clone();
        match fields.iter_mut().find(|(k, _)| k == name) {
            Some(field) => field.1 = value,
            None => fields.push((name.to_string(), value)),
        }
        Self { fields }
    }
}

/// A row proven to carry both element lines.
///
/// The known optional columns are resolved once here so nothing downstream
/// looks fields up by name again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    raw: RawRecord,
    line1: String,
    line2: String,
    catalog_id: Option<String>,
    object_id: Option<String>,
    object_name: Option<String>,
    short_name: Option<String>,
    inclination: Option<String>,
    eccentricity: Option<String>,
    mean_motion: Option<String>,
    epoch: Option<String>,
}

impl ValidatedRecord {
    /// Returns `None` when either element line is absent or empty
    pub fn from_raw(raw: RawRecord, columns: &ColumnMap) -> Option<Self> {
        let line1 = raw.non_empty(&columns.line1)?.to_string();
        let line2 = raw.non_empty(&columns.line2)?.to_string();
        let field = |name: &str| raw.non_empty(name).map(str::to_string);
        let catalog_id = field(&columns.catalog_id);
        let object_id = field(&columns.object_id);
        let object_name = field(&columns.object_name);
        let short_name = field(&columns.short_name);
        let inclination = field(&columns.inclination);
        let eccentricity = field(&columns.eccentricity);
        let mean_motion = field(&columns.mean_motion);
        let epoch = field(&columns.epoch);

        Some(Self {
            raw,
            line1,
            line2,
            catalog_id,
            object_id,
            object_name,
            short_name,
            inclination,
            eccentricity,
            mean_motion,
            epoch,
        })
    }

    pub fn raw(&self) -> &RawRecord {
        &self.raw
    }

    pub fn line1(&self) -> &str {
        &self.line1
    }

    pub fn line2(&self) -> &str {
        &self.line2
    }

    pub fn catalog_id(&self) -> Option<&str> {
        self.catalog_id.as_deref()
    }

    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn inclination(&self) -> Option<&str> {
        self.inclination.as_deref()
    }

    pub fn eccentricity(&self) -> Option<&str> {
        self.eccentricity.as_deref()
    }

    pub fn mean_motion(&self) -> Option<&str> {
        self.mean_motion.as_deref()
    }

    pub fn epoch(&self) -> Option<&str> {
        self.epoch.as_deref()
    }

    /// Best available label for log lines
    pub fn label(&self) -> String {
        match (self.short_name().or(self.object_name()), self.catalog_id()) {
            (Some(name), Some(id)) => format!("{} [{}]", name, id),
            (Some(name), None) => name.to_string(),
            (None, Some(id)) => format!("[{}]", id),
            (None, None) => "<unnamed>".to_string(),
        }
    }
}

/// Descriptive orbital numbers copied from the catalog columns.
///
/// Display only; propagation reads the element lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveElements {
    /// Degrees
    pub inclination: f64,
    pub eccentricity: f64,
    /// Revolutions per day
    pub mean_motion: f64,
    pub epoch: Option<String>,
}

/// A propagable satellite in a catalog snapshot
#[derive(Debug)]
pub struct SatelliteEntry {
    pub(crate) identity: SatelliteIdentity,
    pub(crate) state: OrbitalState,
    pub(crate) record: ValidatedRecord,
    pub(crate) elements: DescriptiveElements,
}

impl SatelliteEntry {
    pub fn identity(&self) -> &SatelliteIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn catalog_id(&self) -> &str {
        &self.identity.catalog_id
    }

    pub fn state(&self) -> &OrbitalState {
        &self.state
    }

    pub fn record(&self) -> &ValidatedRecord {
        &self.record
    }

    pub fn elements(&self) -> &DescriptiveElements {
        &self.elements
    }

    /// All catalog fields verbatim, for detail displays
    pub fn metadata(&self) -> impl Iterator<Item = (&str, &str)> {
        self.record.raw().fields()
    }
}
