use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::KeyField;
use crate::error::{ExportError, Result};
use crate::models::CSV_HEADERS;

/// Union of the key-column values of every previously exported CSV.
///
/// Built fresh on each run, queried once by the diff engine, then dropped.
#[derive(Debug)]
pub struct SnapshotTable {
    key_field: KeyField,
    keys: HashSet<String>,
    files: Vec<PathBuf>,
    rows: usize,
}

impl SnapshotTable {
    /// An empty table; every record diffed against it is new.
    pub fn empty(key_field: KeyField) -> Self {
        Self {
            key_field,
            keys: HashSet::new(),
            files: Vec::new(),
            rows: 0,
        }
    }

    /// Load every `*.csv` in `dir` (non-recursive) and union their key
    /// columns. A directory that does not exist counts as having no
    /// snapshots. A file that cannot be parsed, or whose header lacks the
    /// key column, fails the whole run naming the file.
    pub fn load(dir: &Path, key_field: KeyField) -> Result<Self> {
        let mut table = Self::empty(key_field);

        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "snapshot directory absent, starting empty");
            return Ok(table);
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_csv(path))
            .collect();
        paths.sort();

        for path in paths {
            table.load_file(&path)?;
        }

        tracing::info!(
            files = table.files.len(),
            rows = table.rows,
            keys = table.keys.len(),
            "loaded snapshot tables"
        );
        Ok(table)
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|source| ExportError::SnapshotLoad {
                file: path.to_path_buf(),
                source,
            })?;

        let headers = reader
            .headers()
            .map_err(|source| ExportError::SnapshotLoad {
                file: path.to_path_buf(),
                source,
            })?
            .clone();

        let key_column = self.key_field.column();
        let key_index = headers
            .iter()
            .map(strip_bom)
            .position(|header| header == key_column)
            .ok_or_else(|| ExportError::SnapshotSchema {
                file: path.to_path_buf(),
                missing: key_column.to_string(),
            })?;

        for header in headers.iter().map(strip_bom) {
            if !CSV_HEADERS.contains(&header) {
                tracing::debug!(file = %path.display(), column = header, "ignoring unknown column");
            }
        }

        let mut file_rows = 0usize;
        for record in reader.records() {
            let record = record.map_err(|source| ExportError::SnapshotLoad {
                file: path.to_path_buf(),
                source,
            })?;
            // short rows count as an empty key, matching the untyped union
            // behavior of the original exports
            let key = record.get(key_index).unwrap_or("");
            self.keys.insert(key.to_string());
            file_rows += 1;
        }

        tracing::info!(file = %path.display(), rows = file_rows, "read snapshot");
        self.rows += file_rows;
        self.files.push(path.to_path_buf());
        Ok(())
    }

    /// Exact, case-sensitive membership test; no trimming.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn key_field(&self) -> KeyField {
        self.key_field
    }

    /// Snapshot files read, in load order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Total rows across all loaded files.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn strip_bom(header: &str) -> &str {
    header.trim_start_matches('\u{feff}')
}
