//! kindlediff-core — Kindle metadata extraction, snapshot diffing, CSV/zip export.

pub mod config;
pub mod diff;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod run;
pub mod snapshot;

pub use config::{ExportConfig, KeyField};
pub use diff::diff_against_snapshots;
pub use error::{ExportError, Result};
pub use export::{ExportedArchive, write_diff_archive};
pub use extract::{parse_metadata_cache, parse_metadata_xml};
pub use models::{BookRecord, CSV_HEADERS, EXPORT_HEADERS};
pub use run::{ExportOutcome, run_export};
pub use snapshot::SnapshotTable;
