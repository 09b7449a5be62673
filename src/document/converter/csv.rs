//! CSV format document converter.
//!
//! The first row holds the field names; every following row becomes a
//! Document:
//! ```csv
//! name,city,state,cuisine
//! Union Oyster House,Boston,MA,seafood
//! Tatte,Cambridge,MA,bakery
//! ```

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};

use crate::document::converter::DocumentConverter;
use crate::document::document::Document;
use crate::document::field_value::FieldValue;
use crate::error::{PulseRankError, Result};

/// A document converter for CSV format.
///
/// Cells are kept as text exactly as the file holds them, so `02108` stays
/// `02108`. Integer, float and boolean detection is opt-in through
/// [`with_type_inference`](Self::with_type_inference). Empty cells are left
/// out of the document, which the engine reads as an empty string.
#[derive(Debug, Clone)]
pub struct CsvDocumentConverter {
    /// CSV delimiter character (default: ',')
    delimiter: u8,
    /// Whether to trim whitespace from fields
    trim: bool,
    /// Whether to allow flexible field counts
    flexible: bool,
    /// Whether to parse numeric and boolean cells (default: false)
    infer_types: bool,
}

impl Default for CsvDocumentConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvDocumentConverter {
    /// Create a new CSV converter with comma delimiter.
    pub fn new() -> Self {
        CsvDocumentConverter {
            delimiter: b',',
            trim: true,
            flexible: false,
            infer_types: false,
        }
    }

    /// Set a custom delimiter byte, e.g. `b';'`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to trim whitespace from fields.
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Set whether to allow flexible field counts.
    pub fn with_flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }

    /// Set whether numeric and boolean cells are parsed into typed values.
    ///
    /// Typed values are rendered again when analyzed, so `1.50` is searched
    /// as `1.5`.
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }

    fn record_to_document(
        headers: &StringRecord,
        record: &StringRecord,
        infer_types: bool,
    ) -> Document {
        let mut doc = Document::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if value.is_empty() {
                continue;
            }
            let value = if infer_types {
                FieldValue::infer(value)
            } else {
                FieldValue::Text(value.to_string())
            };
            doc.add_field(header, value);
        }
        doc
    }
}

/// Iterator over the rows of a CSV file.
pub struct CsvDocumentIterator {
    headers: StringRecord,
    records: StringRecordsIntoIter<File>,
    flexible: bool,
    infer_types: bool,
}

impl Iterator for CsvDocumentIterator {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(PulseRankError::from(e))),
        };

        if !self.flexible && record.len() != self.headers.len() {
            return Some(Err(PulseRankError::malformed(format!(
                "CSV field count mismatch: expected {} fields, found {}",
                self.headers.len(),
                record.len()
            ))));
        }

        Some(Ok(CsvDocumentConverter::record_to_document(
            &self.headers,
            &record,
            self.infer_types,
        )))
    }
}

impl DocumentConverter for CsvDocumentConverter {
    type Iter = CsvDocumentIterator;

    fn convert<P: AsRef<Path>>(&self, path: P) -> Result<Self::Iter> {
        let trim = if self.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        };
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(trim)
            .flexible(self.flexible)
            .from_path(path.as_ref())?;

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(PulseRankError::malformed("CSV header is empty"));
        }

        Ok(CsvDocumentIterator {
            headers,
            records: reader.into_records(),
            flexible: self.flexible,
            infer_types: self.infer_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_csv_cells_stay_verbatim_text() {
        let file = write_csv("name,zip,price,open\nUnion Oyster,02108,1.50,TRUE\n");
        let mut iter = CsvDocumentConverter::new().convert(file.path()).unwrap();
        let doc = iter.next().unwrap().unwrap();

        assert_eq!(doc.get_field("zip"), Some(&FieldValue::Text("02108".into())));
        assert_eq!(doc.field_text("zip").unwrap(), "02108");
        assert_eq!(doc.field_text("price").unwrap(), "1.50");
        assert_eq!(doc.field_text("open").unwrap(), "TRUE");
    }

    #[test]
    fn test_csv_type_inference() {
        let file = write_csv("name,city,seats\nUnion Oyster House,Boston,120\n");
        let docs: Vec<_> = CsvDocumentConverter::new()
            .with_type_inference(true)
            .convert(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].get_field("name").unwrap().as_text().unwrap(),
            "Union Oyster House"
        );
        assert!(matches!(
            docs[0].get_field("seats").unwrap(),
            FieldValue::Integer(120)
        ));
    }

    #[test]
    fn test_csv_empty_cells_are_omitted() {
        let file = write_csv("name,city\nTatte,\n");
        let mut iter = CsvDocumentConverter::new().convert(file.path()).unwrap();
        let doc = iter.next().unwrap().unwrap();

        assert!(!doc.has_field("city"));
        assert_eq!(doc.field_text("city").unwrap(), "");
    }

    #[test]
    fn test_csv_custom_delimiter() {
        let file = write_csv("name;city\nTatte;Cambridge\n");
        let mut iter = CsvDocumentConverter::new()
            .with_delimiter(b';')
            .convert(file.path())
            .unwrap();
        let doc = iter.next().unwrap().unwrap();

        assert_eq!(doc.field_text("city").unwrap(), "Cambridge");
    }

    #[test]
    fn test_csv_field_count_mismatch() {
        let file = write_csv("name,city\nTatte,Cambridge,MA\n");
        let mut iter = CsvDocumentConverter::new()
            .with_flexible(true)
            .convert(file.path())
            .unwrap();
        // Flexible readers accept the extra column and drop it.
        assert!(iter.next().unwrap().is_ok());

        let mut strict = CsvDocumentConverter::new().convert(file.path()).unwrap();
        assert!(strict.next().unwrap().is_err());
    }
}
