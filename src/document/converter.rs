//! Document converters for creating documents from files.
//!
//! Each converter turns a file into an iterator of documents. Loading a whole
//! corpus for the ranking engine goes through [`load_documents`], which picks
//! the converter from the file extension.
//!
//! ```no_run
//! use pulse_rank::document::converter::DocumentConverter;
//! use pulse_rank::document::converter::csv::CsvDocumentConverter;
//!
//! let converter = CsvDocumentConverter::new();
//! for doc in converter.convert("restaurants.csv").unwrap() {
//!     println!("{:?}", doc.unwrap());
//! }
//! ```

use std::fs;
use std::path::Path;

use log::debug;

use crate::document::document::Document;
use crate::error::{PulseRankError, Result};

pub mod csv;
pub mod jsonl;

use self::csv::CsvDocumentConverter;
use self::jsonl::JsonlDocumentConverter;

/// A trait for converting file formats into document iterators.
pub trait DocumentConverter {
    /// The iterator type that yields documents.
    type Iter: Iterator<Item = Result<Document>>;

    /// Convert a file into an iterator of Documents.
    fn convert<P: AsRef<Path>>(&self, path: P) -> Result<Self::Iter>;
}

/// Load every document in `path`.
///
/// `.csv` files go through [`CsvDocumentConverter`], `.jsonl` / `.ndjson`
/// through [`JsonlDocumentConverter`], and `.json` must hold a top-level
/// array of objects. The first malformed record aborts the load.
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let documents = match extension.as_str() {
        "csv" => CsvDocumentConverter::new()
            .convert(path)?
            .collect::<Result<Vec<_>>>()?,
        "jsonl" | "ndjson" => JsonlDocumentConverter::new()
            .convert(path)?
            .collect::<Result<Vec<_>>>()?,
        "json" => {
            let raw = fs::read_to_string(path)?;
            match serde_json::from_str::<serde_json::Value>(&raw)? {
                serde_json::Value::Array(items) => items
                    .into_iter()
                    .map(Document::from_json_value)
                    .collect::<Result<Vec<_>>>()?,
                _ => {
                    return Err(PulseRankError::malformed(format!(
                        "{} must contain a JSON array of objects",
                        path.display()
                    )));
                }
            }
        }
        other => {
            return Err(PulseRankError::invalid_argument(format!(
                "unsupported document file extension '{other}' (expected csv, json, jsonl)"
            )));
        }
    };

    debug!("loaded {} documents from {}", documents.len(), path.display());
    Ok(documents)
}
