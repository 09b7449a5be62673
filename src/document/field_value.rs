//! Field value types for documents.
//!
//! # Supported Types
//!
//! - **Text** - String data for full-text search
//! - **Integer** - 64-bit signed integers
//! - **Float** - 64-bit floating-point numbers
//! - **Boolean** - true/false values
//! - **Binary** - Raw byte data (not readable as text)
//! - **Null** - Explicit null values
//!
//! ```
//! use pulse_rank::document::field_value::FieldValue;
//!
//! let text_value = FieldValue::Text("hello".to_string());
//! assert_eq!(text_value.as_text(), Some("hello"));
//!
//! let int_value = FieldValue::Integer(42);
//! assert_eq!(int_value.to_text(), Some("42".to_string()));
//! ```

use serde::{Deserialize, Serialize};

/// Represents a value for a field in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Binary data
    Binary(Vec<u8>),
    /// Null value
    Null,
}

impl FieldValue {
    /// Borrow the text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as text for analysis.
    ///
    /// `Null` renders as the empty string; `Binary` has no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Null => Some(String::new()),
            FieldValue::Binary(_) => None,
        }
    }

    /// Short type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Binary(_) => "binary",
            FieldValue::Null => "null",
        }
    }

    /// Infer the field value type from a raw string.
    pub fn infer(value: &str) -> FieldValue {
        if value.eq_ignore_ascii_case("true") {
            return FieldValue::Boolean(true);
        }
        if value.eq_ignore_ascii_case("false") {
            return FieldValue::Boolean(false);
        }

        if let Ok(int_val) = value.parse::<i64>() {
            return FieldValue::Integer(int_val);
        }

        if let Ok(float_val) = value.parse::<f64>() {
            return FieldValue::Float(float_val);
        }

        FieldValue::Text(value.to_string())
    }

    /// Convert a JSON value into a field value.
    ///
    /// Strings stay text (no inference), nested arrays and objects are kept
    /// as their compact JSON text.
    pub fn from_json(value: serde_json::Value) -> FieldValue {
        use serde_json::Value;

        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    FieldValue::Float(f)
                } else {
                    FieldValue::Text(n.to_string())
                }
            }
            Value::String(s) => FieldValue::Text(s),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer() {
        assert_eq!(FieldValue::infer("TRUE"), FieldValue::Boolean(true));
        assert_eq!(FieldValue::infer("12"), FieldValue::Integer(12));
        assert_eq!(FieldValue::infer("1.5"), FieldValue::Float(1.5));
        assert_eq!(
            FieldValue::infer("Boston"),
            FieldValue::Text("Boston".to_string())
        );
    }

    #[test]
    fn test_to_text() {
        assert_eq!(FieldValue::Float(2.5).to_text(), Some("2.5".to_string()));
        assert_eq!(FieldValue::Null.to_text(), Some(String::new()));
        assert_eq!(FieldValue::Binary(vec![1]).to_text(), None);
    }

    #[test]
    fn test_from_json_keeps_strings_as_text() {
        let value = FieldValue::from_json(serde_json::json!("2024"));
        assert_eq!(value, FieldValue::Text("2024".to_string()));

        let value = FieldValue::from_json(serde_json::json!(["a", "b"]));
        assert_eq!(value, FieldValue::Text("[\"a\",\"b\"]".to_string()));
    }
}
