///! Three-line element text (name, line 1, line 2 repeating)
///!
///! Used when the element lines come from a separate source than the
///! descriptive catalog: blocks are merged into catalog rows by catalog
///! number.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::types::{ColumnMap, RawRecord};

static LINE1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1 ([0-9A-Z]{5})").expect("valid line 1 pattern"));
static LINE2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^2 ([0-9A-Z]{5})").expect("valid line 2 pattern"));

/// One named element set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBlock {
    pub name: String,
    pub catalog_id: String,
    pub line1: String,
    pub line2: String,
}

/// Parse concatenated three-line element sets.
///
/// A window whose second/third lines are not line 1/line 2 slides by one
/// line; a window whose catalog numbers disagree is skipped whole.
pub fn parse_element_blocks(text: &str) -> Vec<ElementBlock> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut blocks = Vec::new();
    let mut i = 0;

    while i + 2 < lines.len() {
        let (name, line1, line2) = (lines[i], lines[i + 1], lines[i + 2]);

        if !(line1.starts_with("1 ") && line2.starts_with("2 ")) {
            i += 1;
            continue;
        }

        let id1 = LINE1_RE.captures(line1).map(|c| c[1].to_string());
        let id2 = LINE2_RE.captures(line2).map(|c| c[1].to_string());

        match (id1, id2) {
            (Some(id1), Some(id2)) if id1 == id2 => blocks.push(ElementBlock {
                name: name.to_string(),
                catalog_id: id1,
                line1: line1.to_string(),
                line2: line2.to_string(),
            }),
            _ => debug!("Skipping element block '{}' with mismatched catalog numbers", name),
        }
        i += 3;
    }

    blocks
}

/// Catalog numbers compare without leading zeros ("00005" == "5")
pub fn normalize_catalog_id(id: &str) -> &str {
    let trimmed = id.trim().trim_start_matches('0');
    if trimmed.is_empty() && !id.trim().is_empty() {
        "0"
    } else {
        trimmed
    }
}

/// Fill element-line fields of `records` from `blocks` by catalog number.
///
/// Rows without a matching block come back unchanged.
pub fn merge_element_blocks(
    records: Vec<RawRecord>,
    blocks: &[ElementBlock],
    columns: &ColumnMap,
) -> Vec<RawRecord> {
    let by_id: HashMap<&str, &ElementBlock> = blocks
        .iter()
        .map(|b| (normalize_catalog_id(&b.catalog_id), b))
        .collect();

    let mut merged = 0;
    let records: Vec<RawRecord> = records
        .into_iter()
        .map(|record| {
            let block = record
                .non_empty(&columns.catalog_id)
                .and_then(|id| by_id.get(normalize_catalog_id(id)));

            match block {
                Some(block) => {
                    merged += 1;
                    record
                        .with_field(&columns.line1, block.line1.as_str())
                        .with_field(&columns.line2, block.line2.as_str())
                }
                None => record,
            }
        })
        .collect();

    debug!("Merged element lines into {} of {} records", merged, records.len());

    records
}
