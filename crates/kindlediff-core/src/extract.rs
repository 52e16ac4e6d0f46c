use std::path::Path;

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::{ExportError, Result};
use crate::models::BookRecord;

/// Placeholder for scalar fields absent from the cache.
const MISSING: &str = "N/A";

#[derive(Debug, Deserialize)]
struct SyncResponse {
    add_update_list: Option<AddUpdateList>,
}

#[derive(Debug, Default, Deserialize)]
struct AddUpdateList {
    #[serde(rename = "meta_data", default)]
    entries: Vec<MetaData>,
}

#[derive(Debug, Deserialize)]
struct MetaData {
    #[serde(rename = "ASIN")]
    asin: Option<String>,
    title: Option<TextValue>,
    #[serde(default)]
    authors: AuthorList,
    #[serde(default)]
    publishers: PublisherList,
    publication_date: Option<String>,
    purchase_date: Option<String>,
    cde_contenttype: Option<String>,
    #[serde(default)]
    origins: OriginList,
}

/// Element content for tags that may carry attributes,
/// e.g. `<title pronunciation="…">…</title>`.
#[derive(Debug, Default, Deserialize)]
struct TextValue {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthorList {
    #[serde(rename = "author", default)]
    authors: Vec<TextValue>,
}

#[derive(Debug, Default, Deserialize)]
struct PublisherList {
    #[serde(rename = "publisher", default)]
    publishers: Vec<TextValue>,
}

#[derive(Debug, Default, Deserialize)]
struct OriginList {
    #[serde(rename = "origin", default)]
    origins: Vec<Origin>,
}

#[derive(Debug, Default, Deserialize)]
struct Origin {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Read a Kindle sync metadata cache and flatten every `meta_data` entry
/// into a [`BookRecord`], in document order.
pub fn parse_metadata_cache(path: &Path) -> Result<Vec<BookRecord>> {
    let xml = std::fs::read_to_string(path)?;
    parse_metadata_xml(&xml)
}

/// Same as [`parse_metadata_cache`], on an already-read document.
pub fn parse_metadata_xml(xml: &str) -> Result<Vec<BookRecord>> {
    let response: SyncResponse =
        from_str(xml).map_err(|e| ExportError::Xml(e.to_string()))?;

    let entries = response
        .add_update_list
        .map(|list| list.entries)
        .unwrap_or_default();

    tracing::debug!(entries = entries.len(), "parsed metadata cache");
    Ok(entries.into_iter().map(flatten_entry).collect())
}

fn flatten_entry(entry: MetaData) -> BookRecord {
    BookRecord {
        asin: scalar_or_missing(entry.asin),
        title: scalar_or_missing(entry.title.and_then(|t| t.value)),
        authors: join_values(entry.authors.authors),
        publisher: join_values(entry.publishers.publishers),
        publication_date: scalar_or_missing(entry.publication_date),
        purchase_date: scalar_or_missing(entry.purchase_date),
        content_type: scalar_or_missing(entry.cde_contenttype),
        origin_type: join_origins(entry.origins.origins),
    }
}

fn scalar_or_missing(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => MISSING.to_string(),
    }
}

/// Join child text values with `", "`; zero children yield `""`, not `"N/A"`.
fn join_values(values: Vec<TextValue>) -> String {
    values
        .into_iter()
        .map(|v| v.value.unwrap_or_default())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_origins(origins: Vec<Origin>) -> String {
    origins
        .into_iter()
        .map(|o| o.kind.unwrap_or_default())
        .collect::<Vec<_>>()
        .join(", ")
}
