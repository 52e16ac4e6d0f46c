pub mod book;

pub use book::{BookRecord, CSV_HEADERS, EXPORT_HEADERS};
