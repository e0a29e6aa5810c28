///! Catalog CSV parser
///!
///! Turns the raw catalog text (header line, then one line per satellite)
///! into ordered `RawRecord`s, then keeps the rows that carry both element
///! lines.

use tracing::{debug, warn};

use super::types::{ColumnMap, RawRecord, ValidatedRecord};

/// Result of filtering raw rows down to propagable ones
#[derive(Debug, Default)]
pub struct Validation {
    pub records: Vec<ValidatedRecord>,
    /// Rows dropped for a missing or empty element line
    pub dropped: usize,
}

/// Parse catalog text into one record per data line.
///
/// Data lines shorter than the header get `""` for the missing trailing
/// fields, so every record carries every header name.
pub fn parse_catalog(text: &str) -> Vec<RawRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow short and long rows
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(|h| h.trim().to_string()).collect(),
        Err(e) => {
            warn!("Failed to read catalog header: {}", e);
            return Vec::new();
        }
    };

    if headers.iter().all(|h| h.is_empty()) {
        return Vec::new();
    }

    let mut records = Vec::new();
    let mut error_count = 0;

    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(row) => {
                let record = RawRecord::from_pairs(
                    headers
                        .iter()
                        .enumerate()
                        .map(|(i, name)| (name.as_str(), row.get(i).unwrap_or(""))),
                );
                records.push(record);
            }
            Err(e) => {
                error_count += 1;
                warn!("Error parsing catalog record {}: {}", index + 1, e);
            }
        }
    }

    debug!(
        "Parsed {} catalog rows ({} headers), {} errors",
        records.len(),
        headers.len(),
        error_count
    );

    records
}

/// Keep only rows carrying both element lines
pub fn validate_records(records: Vec<RawRecord>, columns: &ColumnMap) -> Validation {
    let mut validation = Validation::default();

    for raw in records {
        let catalog_id = raw.non_empty(&columns.catalog_id).map(str::to_string);
        match ValidatedRecord::from_raw(raw, columns) {
            Some(record) => validation.records.push(record),
            None => {
                validation.dropped += 1;
                debug!(
                    "Dropping catalog row {} without element lines",
                    catalog_id.as_deref().unwrap_or("<no id>")
                );
            }
        }
    }

    validation
}
