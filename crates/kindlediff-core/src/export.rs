use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use serde::Serialize;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::models::{BookRecord, EXPORT_HEADERS};

/// UTF-8 byte-order mark, so spreadsheet tools detect the encoding.
const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];

/// The produced artifact: a zip holding exactly one CSV.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedArchive {
    /// Path of the written zip.
    pub zip_path: PathBuf,
    /// Name of the CSV inside the zip.
    pub csv_name: String,
    /// Records written.
    pub records: usize,
}

/// Write `records` as a timestamped CSV, compress it into a sibling zip,
/// and remove the intermediate CSV. `Title` is always the first column.
///
/// The caller is expected to skip this entirely for an empty diff; an empty
/// slice would still produce an archive holding only the header row.
pub fn write_diff_archive(
    records: &[BookRecord],
    config: &ExportConfig,
) -> Result<ExportedArchive> {
    let timestamp = render_timestamp(&config.timestamp_format)?;
    let csv_name = format!("{}_{}.csv", config.file_prefix, timestamp);
    let zip_name = format!("{}_{}.zip", config.file_prefix, timestamp);

    fs::create_dir_all(&config.output_dir)?;
    let csv_path = config.output_dir.join(&csv_name);
    let zip_path = config.output_dir.join(&zip_name);

    let mut buffer = Vec::new();
    buffer.extend_from_slice(UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(EXPORT_HEADERS)?;
        for record in records {
            writer.write_record(record.export_row())?;
        }
        writer.flush()?;
    }

    fs::write(&csv_path, &buffer)?;
    tracing::info!(file = %csv_path.display(), records = records.len(), "wrote diff CSV");

    let mut archive = ZipWriter::new(fs::File::create(&zip_path)?);
    archive.start_file(csv_name.as_str(), SimpleFileOptions::default())?;
    archive.write_all(&buffer)?;
    archive.finish()?;

    fs::remove_file(&csv_path)?;
    tracing::info!(file = %zip_path.display(), "compressed diff into archive");

    Ok(ExportedArchive {
        zip_path,
        csv_name,
        records: records.len(),
    })
}

/// Format the current local time, rejecting invalid strftime patterns
/// instead of letting `chrono` panic while rendering.
fn render_timestamp(pattern: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.contains(&Item::Error) {
        return Err(ExportError::Config(format!(
            "invalid timestamp format '{pattern}'"
        )));
    }
    Ok(Local::now().format_with_items(items.into_iter()).to_string())
}
