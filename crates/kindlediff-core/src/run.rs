use std::path::PathBuf;

use serde::Serialize;

use crate::config::ExportConfig;
use crate::diff::diff_against_snapshots;
use crate::error::Result;
use crate::export::{ExportedArchive, write_diff_archive};
use crate::extract::parse_metadata_cache;
use crate::snapshot::SnapshotTable;

/// What a run saw and produced; `archive` is `None` when there was nothing
/// new to export, which is a normal outcome.
#[derive(Debug, Serialize)]
pub struct ExportOutcome {
    pub extracted: usize,
    pub snapshot_files: Vec<PathBuf>,
    pub snapshot_rows: usize,
    pub new_records: usize,
    pub archive: Option<ExportedArchive>,
}

/// One full export: extract the metadata cache, union prior snapshots,
/// diff, and archive the new records if there are any.
pub fn run_export(config: &ExportConfig) -> Result<ExportOutcome> {
    let records = parse_metadata_cache(&config.metadata_cache)?;
    let snapshots = SnapshotTable::load(&config.snapshot_dir, config.key_field)?;

    let extracted = records.len();
    let snapshot_files = snapshots.files().to_vec();
    let snapshot_rows = snapshots.rows();

    let new = diff_against_snapshots(records, &snapshots);
    let archive = if new.is_empty() {
        None
    } else {
        Some(write_diff_archive(&new, config)?)
    };

    Ok(ExportOutcome {
        extracted,
        snapshot_files,
        snapshot_rows,
        new_records: new.len(),
        archive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;

    use tempfile::TempDir;

    const CACHE_XML: &str = r#"<response>
  <add_update_list>
    <meta_data>
      <ASIN>X1</ASIN>
      <title>Book A</title>
    </meta_data>
    <meta_data>
      <ASIN>X2</ASIN>
      <title>Book B</title>
    </meta_data>
  </add_update_list>
</response>"#;

    fn setup(xml: &str) -> (TempDir, ExportConfig) {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("KindleSyncMetadataCache.xml");
        fs::write(&cache, xml).unwrap();
        let snapshots = dir.path().join("snapshots");
        fs::create_dir(&snapshots).unwrap();
        let output = dir.path().join("out");

        let config = ExportConfig {
            metadata_cache: cache,
            snapshot_dir: snapshots,
            output_dir: output,
            ..ExportConfig::default()
        };
        (dir, config)
    }

    fn unpack_into_snapshots(archive: &ExportedArchive, config: &ExportConfig) {
        let file = fs::File::open(&archive.zip_path).unwrap();
        let mut zip = zip::ZipArchive::new(file).unwrap();
        let mut inner = zip.by_name(&archive.csv_name).unwrap();
        let mut contents = Vec::new();
        inner.read_to_end(&mut contents).unwrap();
        fs::write(config.snapshot_dir.join(&archive.csv_name), contents).unwrap();
    }

    #[test]
    fn first_run_exports_everything() {
        let (_dir, config) = setup(CACHE_XML);
        let outcome = run_export(&config).unwrap();

        assert_eq!(outcome.extracted, 2);
        assert_eq!(outcome.new_records, 2);
        assert!(outcome.snapshot_files.is_empty());
        let archive = outcome.archive.expect("archive for non-empty diff");
        assert!(archive.zip_path.exists());
    }

    #[test]
    fn second_run_against_own_output_is_empty() {
        let (_dir, config) = setup(CACHE_XML);
        let first = run_export(&config).unwrap();
        unpack_into_snapshots(first.archive.as_ref().unwrap(), &config);

        let second = run_export(&config).unwrap();
        assert_eq!(second.extracted, 2);
        assert_eq!(second.new_records, 0);
        assert!(second.archive.is_none());
        assert_eq!(second.snapshot_files.len(), 1);
        assert_eq!(second.snapshot_rows, 2);
    }

    #[test]
    fn known_title_is_not_re_exported() {
        let (_dir, config) = setup(CACHE_XML);
        fs::write(
            config.snapshot_dir.join("prior.csv"),
            "Title,ASIN\nBook A,OLD\n",
        )
        .unwrap();

        let outcome = run_export(&config).unwrap();
        assert_eq!(outcome.new_records, 1);
    }

    #[test]
    fn empty_cache_produces_no_artifact() {
        let (_dir, config) = setup("<response><add_update_list/></response>");
        let outcome = run_export(&config).unwrap();

        assert_eq!(outcome.extracted, 0);
        assert_eq!(outcome.new_records, 0);
        assert!(outcome.archive.is_none());
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn missing_cache_is_fatal() {
        let (_dir, mut config) = setup(CACHE_XML);
        config.metadata_cache = config.metadata_cache.with_file_name("gone.xml");
        assert!(run_export(&config).is_err());
    }
}
