//! JSONL format document converter.
//!
//! Each non-empty line holds one JSON object:
//! ```jsonl
//! {"name": "Union Oyster House", "city": "Boston"}
//! {"name": "Tatte", "city": "Cambridge"}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::document::converter::DocumentConverter;
use crate::document::document::Document;
use crate::error::{PulseRankError, Result};

/// A document converter for JSONL format.
#[derive(Debug, Clone, Default)]
pub struct JsonlDocumentConverter;

impl JsonlDocumentConverter {
    /// Create a new JSONL converter.
    pub fn new() -> Self {
        JsonlDocumentConverter
    }

    /// Parse a single JSON line into a Document.
    pub fn parse_json_line(&self, line: &str) -> Result<Document> {
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| PulseRankError::malformed(format!("Failed to parse JSON: {e}")))?;
        Document::from_json_value(value)
    }
}

/// Iterator over JSONL documents.
pub struct JsonlDocumentIterator {
    reader: BufReader<File>,
    converter: JsonlDocumentConverter,
    line_number: usize,
}

impl Iterator for JsonlDocumentIterator {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        loop {
            line.clear();
            self.line_number += 1;
            match self.reader.read_line(&mut line) {
                Ok(0) => return None, // EOF
                Ok(_) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let line_number = self.line_number;
                    return Some(self.converter.parse_json_line(line).map_err(|e| match e {
                        PulseRankError::MalformedInput(msg) => {
                            PulseRankError::malformed(format!("line {line_number}: {msg}"))
                        }
                        other => other,
                    }));
                }
                Err(e) => return Some(Err(PulseRankError::from(e))),
            }
        }
    }
}

impl DocumentConverter for JsonlDocumentConverter {
    type Iter = JsonlDocumentIterator;

    fn convert<P: AsRef<Path>>(&self, path: P) -> Result<Self::Iter> {
        let file = File::open(path.as_ref())?;

        Ok(JsonlDocumentIterator {
            reader: BufReader::new(file),
            converter: self.clone(),
            line_number: 0,
        })
    }
}
