///! Immutable catalog snapshot
///!
///! One ingestion + initialization pass produces one `Catalog`. Owners
///! share it as `Arc<Catalog>` and replace it wholesale on reload.

use chrono::{DateTime, Utc};
use tracing::info;

use super::initializer::{InitFailureRecord, initialize};
use super::parser::{parse_catalog, validate_records};
use super::tle_block::{merge_element_blocks, parse_element_blocks};
use super::types::{ColumnMap, RawRecord, SatelliteEntry};

/// Counters from the pass that built a snapshot
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub rows_parsed: usize,
    pub rows_validated: usize,
    /// Rows without both element lines
    pub rows_dropped: usize,
    pub entries: usize,
    pub init_failures: Vec<InitFailureRecord>,
}

impl std::fmt::Display for LoadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rows: {}, With elements: {}, Dropped: {}, Entries: {}, Init failures: {}",
            self.rows_parsed,
            self.rows_validated,
            self.rows_dropped,
            self.entries,
            self.init_failures.len()
        )
    }
}

/// Ordered satellite entries, read-only once built
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<SatelliteEntry>,
    loaded_at: DateTime<Utc>,
    report: LoadReport,
}

impl Catalog {
    /// Run ingestion and initialization over catalog text
    pub fn from_text(text: &str, columns: &ColumnMap) -> Self {
        Self::from_records(parse_catalog(text), columns)
    }

    /// Like `from_text`, first filling element lines from three-line
    /// element text matched by catalog number
    pub fn from_text_with_elements(text: &str, element_text: &str, columns: &ColumnMap) -> Self {
        let blocks = parse_element_blocks(element_text);
        info!("Parsed {} element blocks", blocks.len());
        Self::from_records(merge_element_blocks(parse_catalog(text), &blocks, columns), columns)
    }

    pub fn from_records(records: Vec<RawRecord>, columns: &ColumnMap) -> Self {
        let rows_parsed = records.len();
        let validation = validate_records(records, columns);
        let rows_validated = validation.records.len();

        info!(
            "Loaded {} catalog rows, {} with element lines",
            rows_parsed, rows_validated
        );

        let initialization = initialize(validation.records);

        let report = LoadReport {
            rows_parsed,
            rows_validated,
            rows_dropped: validation.dropped,
            entries: initialization.entries.len(),
            init_failures: initialization.failures,
        };

        Self {
            entries: initialization.entries,
            loaded_at: Utc::now(),
            report,
        }
    }

    pub fn entries(&self) -> &[SatelliteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}
