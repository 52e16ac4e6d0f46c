use serde::Serialize;

use crate::config::KeyField;

/// Column headers as written by every export, in extraction order.
/// Older snapshots were produced with these exact names (spaces included),
/// so they double as the loader's known schema.
pub const CSV_HEADERS: &[&str] = &[
    "ASIN",
    "Title",
    "Authors",
    "Publisher",
    "Publication Date",
    "Purchase Date",
    "Content Type",
    "Origin Type",
];

/// Output column order: `Title` first, the rest in extraction order.
pub const EXPORT_HEADERS: &[&str] = &[
    "Title",
    "ASIN",
    "Authors",
    "Publisher",
    "Publication Date",
    "Purchase Date",
    "Content Type",
    "Origin Type",
];

/// One entry of the Kindle sync metadata cache, flattened.
///
/// Scalar fields hold `"N/A"` when the source element was missing or empty;
/// list-valued fields (`authors`, `publisher`, `origin_type`) are `", "`
/// joins of their children and hold `""` when there were none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    #[serde(rename = "ASIN")]
    pub asin: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Authors")]
    pub authors: String,
    #[serde(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "Publication Date")]
    pub publication_date: String,
    #[serde(rename = "Purchase Date")]
    pub purchase_date: String,
    #[serde(rename = "Content Type")]
    pub content_type: String,
    #[serde(rename = "Origin Type")]
    pub origin_type: String,
}

impl BookRecord {
    /// The value that identifies this record for deduplication.
    pub fn key(&self, field: KeyField) -> &str {
        match field {
            KeyField::Title => &self.title,
            KeyField::Asin => &self.asin,
        }
    }

    /// Field values in `EXPORT_HEADERS` order.
    pub fn export_row(&self) -> [&str; 8] {
        [
            &self.title,
            &self.asin,
            &self.authors,
            &self.publisher,
            &self.publication_date,
            &self.purchase_date,
            &self.content_type,
            &self.origin_type,
        ]
    }
}
