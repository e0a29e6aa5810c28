///! Satellite catalog module
///!
///! ## Main Components
///! - `parse_catalog` / `validate_records`: CSV text to records with element lines
///! - `initialize`: validated records to `SatelliteEntry` values
///! - `parse_element_blocks` / `merge_element_blocks`: three-line element text
///! - `Catalog`: one immutable snapshot, shared behind `Arc`
///! - `CatalogSource` / `load_catalog`: fetching catalog text from file or HTTP

mod types;
pub use types::{ColumnMap, DescriptiveElements, RawRecord, SatelliteEntry, ValidatedRecord};

mod parser;
pub use parser::{Validation, parse_catalog, validate_records};

mod tle_block;
pub use tle_block::{ElementBlock, merge_element_blocks, normalize_catalog_id, parse_element_blocks};

mod initializer;
pub use initializer::{
    InitFailureRecord, Initialization, build_entry, initialize, parse_metadata_number,
    resolve_display_name,
};

mod snapshot;
pub use snapshot::{Catalog, LoadReport};

mod source;
pub use source::{
    CatalogFetcher, CatalogSource, SourceFetcher, TransportError, load_catalog, load_from_settings,
};
