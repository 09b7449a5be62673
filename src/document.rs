//! Document module.
//!
//! Documents are schema-less collections of field-value pairs. The ranking
//! engine reads a fixed, configurable list of fields from each document and
//! ignores everything else.
//!
//! # Core Components
//!
//! - [`document::Document`] - The document structure with field-value pairs
//! - [`field_value::FieldValue`] - Enum representing the supported value types
//! - [`converter`] - Loaders that turn CSV / JSONL files into documents
//!
//! # Examples
//!
//! ```
//! use pulse_rank::document::document::Document;
//!
//! let doc = Document::builder()
//!     .add_text("name", "Union Oyster House")
//!     .add_text("city", "Boston")
//!     .add_integer("founded", 1826)
//!     .build();
//!
//! assert!(doc.has_field("city"));
//! assert_eq!(doc.len(), 3);
//! ```

pub mod converter;
#[allow(clippy::module_inception)]
pub mod document;
pub mod field_value;
