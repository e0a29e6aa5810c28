///! Propagator initializer
///!
///! Builds one `SatelliteEntry` per validated record. A record whose
///! element set SGP4 rejects is logged and left out; the pass continues.

use satglobe_common::SatelliteIdentity;
use tracing::{info, warn};

use super::types::{DescriptiveElements, SatelliteEntry, ValidatedRecord};
use crate::module::propagation::{InitFailure, OrbitalState, build_orbital_state};

/// A record that did not become an entry
#[derive(Debug, Clone)]
pub struct InitFailureRecord {
    /// Display label of the failed record
    pub label: String,
    pub catalog_id: Option<String>,
    pub failure: InitFailure,
}

/// Output of one initialization pass, input order preserved
#[derive(Debug, Default)]
pub struct Initialization {
    pub entries: Vec<SatelliteEntry>,
    pub failures: Vec<InitFailureRecord>,
}

/// Initialize every record, collecting failures instead of stopping
pub fn initialize(records: Vec<ValidatedRecord>) -> Initialization {
    let mut initialization = Initialization::default();

    for record in records {
        let label = record.label();
        let catalog_id = record.catalog_id().map(str::to_string);

        match build_entry(record) {
            Ok(entry) => initialization.entries.push(entry),
            Err(failure) => {
                warn!("Failed to initialize satellite {}: {}", label, failure);
                initialization.failures.push(InitFailureRecord {
                    label,
                    catalog_id,
                    failure,
                });
            }
        }
    }

    info!(
        "Initialized {} satellite propagators ({} failed)",
        initialization.entries.len(),
        initialization.failures.len()
    );

    initialization
}

/// Build the propagation state and identity for one record
pub fn build_entry(record: ValidatedRecord) -> Result<SatelliteEntry, InitFailure> {
    let state = build_orbital_state(record.line1(), record.line2())?;
    let identity = resolve_identity(&record, &state);
    let elements = DescriptiveElements {
        inclination: parse_metadata_number(record.inclination()),
        eccentricity: parse_metadata_number(record.eccentricity()),
        mean_motion: parse_metadata_number(record.mean_motion()),
        epoch: record.epoch().map(str::to_string),
    };

    Ok(SatelliteEntry {
        identity,
        state,
        record,
        elements,
    })
}

fn resolve_identity(record: &ValidatedRecord, state: &OrbitalState) -> SatelliteIdentity {
    // fall back to the catalog number carried by line 1
    let catalog_id = record
        .catalog_id()
        .map(str::to_string)
        .unwrap_or_else(|| state.norad_id().to_string());

    let name = resolve_display_name(record.short_name(), record.object_name(), &catalog_id);

    SatelliteIdentity {
        object_id: record.object_id().map(str::to_string),
        ..SatelliteIdentity::new(name, catalog_id)
    }
}

/// Short name, then object name, then `SAT-<catalog id>`
pub fn resolve_display_name(
    short_name: Option<&str>,
    object_name: Option<&str>,
    catalog_id: &str,
) -> String {
    short_name
        .or(object_name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("SAT-{}", catalog_id))
}

/// Descriptive numbers only: anything unusable becomes 0
pub fn parse_metadata_number(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::catalog::{ColumnMap, RawRecord};

    const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    fn validated(pairs: &[(&str, &str)]) -> ValidatedRecord {
        let mut all = vec![("TLE_LINE1", ISS_LINE1), ("TLE_LINE2", ISS_LINE2)];
        all.extend_from_slice(pairs);
        ValidatedRecord::from_raw(RawRecord::from_pairs(all), &ColumnMap::default()).unwrap()
    }

    #[test]
    fn test_display_name_priority() {
        // missing short name: object name wins
        let entry = build_entry(validated(&[
            ("OBJECT_NAME", "ISS (ZARYA)"),
            ("NORAD_CAT_ID", "25544"),
        ]))
        .unwrap();
        assert_eq!(entry.name(), "ISS (ZARYA)");

        // missing object name: short name wins
        let entry = build_entry(validated(&[
            ("N2YO_SAT_NAME", "SPACE STATION"),
            ("NORAD_CAT_ID", "25544"),
        ]))
        .unwrap();
        assert_eq!(entry.name(), "SPACE STATION");

        // missing identifier: short name still first
        let entry = build_entry(validated(&[
            ("N2YO_SAT_NAME", "SPACE STATION"),
            ("OBJECT_NAME", "ISS (ZARYA)"),
        ]))
        .unwrap();
        assert_eq!(entry.name(), "SPACE STATION");
        assert_eq!(entry.catalog_id(), "25544");
    }

    #[test]
    fn test_synthesized_name_from_catalog_id() {
        let entry = build_entry(validated(&[("NORAD_CAT_ID", "25544")])).unwrap();
        assert_eq!(entry.name(), "SAT-25544");

        // no id column at all: catalog number from line 1
        let entry = build_entry(validated(&[])).unwrap();
        assert_eq!(entry.name(), "SAT-25544");
        assert_eq!(entry.catalog_id(), "25544");
    }

    #[test]
    fn test_unparsable_inclination_defaults_to_zero() {
        let entry = build_entry(validated(&[
            ("INCLINATION", "not-a-number"),
            ("ECCENTRICITY", "0.0006703"),
            ("MEAN_MOTION", "NaN"),
        ]))
        .unwrap();

        assert_eq!(entry.elements().inclination, 0.0);
        assert!((entry.elements().eccentricity - 0.0006703).abs() < 1e-12);
        assert_eq!(entry.elements().mean_motion, 0.0);
        assert_eq!(entry.elements().epoch, None);
    }

    #[test]
    fn test_initialize_skips_failures_and_keeps_order() {
        let bad_line1 = ISS_LINE1.replace("2927", "2920");
        let records = vec![
            validated(&[("NORAD_CAT_ID", "1")]),
            ValidatedRecord::from_raw(
                RawRecord::from_pairs([
                    ("NORAD_CAT_ID", "2"),
                    ("TLE_LINE1", bad_line1.as_str()),
                    ("TLE_LINE2", ISS_LINE2),
                ]),
                &ColumnMap::default(),
            )
            .unwrap(),
            validated(&[("NORAD_CAT_ID", "3")]),
        ];

        let initialization = initialize(records);
        let ids: Vec<&str> = initialization.entries.iter().map(|e| e.catalog_id()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        assert_eq!(initialization.failures.len(), 1);
        assert_eq!(initialization.failures[0].catalog_id.as_deref(), Some("2"));
        assert!(matches!(
            initialization.failures[0].failure,
            InitFailure::MalformedElements(_)
        ));
    }

    #[test]
    fn test_metadata_passes_through_verbatim() {
        let entry = build_entry(validated(&[("OWNER", "  NASA "), ("LAUNCH_DATE", "1998-11-20")])).unwrap();
        let metadata: Vec<(&str, &str)> = entry.metadata().collect();
        assert!(metadata.contains(&("OWNER", "  NASA ")));
        assert!(metadata.contains(&("LAUNCH_DATE", "1998-11-20")));
    }
}
