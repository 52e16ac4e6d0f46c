use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Which record field identifies a book for deduplication.
///
/// `Title` matches the historical export behavior; `Asin` is stricter but
/// will re-export books whose snapshots predate ASIN capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyField {
    #[default]
    Title,
    Asin,
}

impl KeyField {
    /// Column name in exported CSVs.
    pub fn column(self) -> &'static str {
        match self {
            KeyField::Title => "Title",
            KeyField::Asin => "ASIN",
        }
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyField::Title => write!(f, "title"),
            KeyField::Asin => write!(f, "asin"),
        }
    }
}

impl FromStr for KeyField {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(KeyField::Title),
            "asin" => Ok(KeyField::Asin),
            other => Err(ExportError::Config(format!(
                "unknown key field '{other}' (expected 'title' or 'asin')"
            ))),
        }
    }
}

/// Run configuration, replacing the hardcoded paths of the original export
/// script. Loadable from a TOML file; every field has a default so a partial
/// file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Kindle sync metadata cache to extract from.
    pub metadata_cache: PathBuf,
    /// Directory scanned for previously exported CSVs.
    pub snapshot_dir: PathBuf,
    /// Directory the zip archive is written to.
    pub output_dir: PathBuf,
    /// Deduplication key.
    pub key_field: KeyField,
    /// Stem prefix of the exported CSV/zip pair.
    pub file_prefix: String,
    /// `chrono` format string appended to the prefix.
    pub timestamp_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            metadata_cache: PathBuf::from("KindleSyncMetadataCache.xml"),
            snapshot_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            key_field: KeyField::default(),
            file_prefix: "kindle_metadata_diff".to_string(),
            timestamp_format: "%Y%m%d%H%M%S".to_string(),
        }
    }
}

impl ExportConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| ExportError::Config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::TempDir;

    #[test]
    fn defaults_match_reference_script() {
        let config = ExportConfig::default();
        assert_eq!(
            config.metadata_cache,
            PathBuf::from("KindleSyncMetadataCache.xml")
        );
        assert_eq!(config.snapshot_dir, PathBuf::from("."));
        assert_eq!(config.key_field, KeyField::Title);
        assert_eq!(config.file_prefix, "kindle_metadata_diff");
        assert_eq!(config.timestamp_format, "%Y%m%d%H%M%S");
    }

    #[test]
    fn loads_partial_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kindlediff.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "snapshot_dir = \"/data/exports\"").unwrap();
        writeln!(file, "key_field = \"asin\"").unwrap();

        let config = ExportConfig::load(&path).unwrap();
        assert_eq!(config.snapshot_dir, PathBuf::from("/data/exports"));
        assert_eq!(config.key_field, KeyField::Asin);
        // untouched fields keep their defaults
        assert_eq!(config.file_prefix, "kindle_metadata_diff");
    }

    #[test]
    fn rejects_unknown_key_field() {
        let err = KeyField::from_str("isbn").unwrap_err();
        assert!(err.to_string().contains("isbn"));
    }

    #[test]
    fn key_field_column_names() {
        assert_eq!(KeyField::Title.column(), "Title");
        assert_eq!(KeyField::Asin.column(), "ASIN");
    }
}
