//! Record-level analysis: the token stream of a document or a query.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::document::document::Document;
use crate::error::Result;

/// Analyzes a fixed list of fields of a document, or a raw query string.
///
/// Field values are joined with a single space before analysis so that
/// tokens never fuse across field boundaries. A missing field contributes
/// the empty string. Queries go through the same analyzer without the
/// field-joining step.
#[derive(Clone)]
pub struct RecordAnalyzer {
    analyzer: Arc<dyn Analyzer>,
    fields: Vec<String>,
}

impl std::fmt::Debug for RecordAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordAnalyzer")
            .field("analyzer", &self.analyzer.name())
            .field("fields", &self.fields)
            .finish()
    }
}

impl RecordAnalyzer {
    /// Analyze `fields` with the default whitespace + lowercase pipeline.
    pub fn new(fields: Vec<String>) -> Self {
        Self::with_analyzer(Arc::new(PipelineAnalyzer::whitespace_lowercase()), fields)
    }

    /// Analyze `fields` with a custom analyzer.
    pub fn with_analyzer(analyzer: Arc<dyn Analyzer>, fields: Vec<String>) -> Self {
        RecordAnalyzer { analyzer, fields }
    }

    /// The fields read from each document, in concatenation order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    /// The concatenated text of the configured fields.
    pub fn record_text(&self, document: &Document) -> Result<String> {
        let values = self
            .fields
            .iter()
            .map(|field| document.field_text(field))
            .collect::<Result<Vec<_>>>()?;
        Ok(values.join(" "))
    }

    /// Tokens of a document.
    pub fn analyze_record(&self, document: &Document) -> Result<Vec<String>> {
        let text = self.record_text(document)?;
        self.analyzer.analyze_terms(&text)
    }

    /// Tokens of a free-text query.
    pub fn analyze_query(&self, query: &str) -> Result<Vec<String>> {
        self.analyzer.analyze_terms(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::field_value::FieldValue;
    use crate::error::PulseRankError;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_analyze_record_concatenates_fields() {
        let analyzer = RecordAnalyzer::new(fields(&["name", "city", "state"]));
        let doc = Document::builder()
            .add_text("name", "Union Oyster House")
            .add_text("city", "Boston")
            .add_text("cuisine", "Seafood")
            .build();

        let tokens = analyzer.analyze_record(&doc).unwrap();

        // "state" is missing and "cuisine" is not configured.
        assert_eq!(tokens, vec!["union", "oyster", "house", "boston"]);
    }

    #[test]
    fn test_fields_do_not_fuse() {
        let analyzer = RecordAnalyzer::new(fields(&["city", "state"]));
        let doc = Document::builder()
            .add_text("city", "Boston")
            .add_text("state", "MA")
            .build();

        assert_eq!(analyzer.record_text(&doc).unwrap(), "Boston MA");
        assert_eq!(analyzer.analyze_record(&doc).unwrap(), vec!["boston", "ma"]);
    }

    #[test]
    fn test_analyze_query() {
        let analyzer = RecordAnalyzer::new(fields(&["city"]));
        assert_eq!(
            analyzer.analyze_query("  Boston   Seafood ").unwrap(),
            vec!["boston", "seafood"]
        );
        assert!(analyzer.analyze_query("   ").unwrap().is_empty());
    }

    #[test]
    fn test_deterministic() {
        let analyzer = RecordAnalyzer::new(fields(&["city"]));
        let doc = Document::builder().add_text("city", "New  York").build();

        assert_eq!(
            analyzer.analyze_record(&doc).unwrap(),
            analyzer.analyze_record(&doc).unwrap()
        );
    }

    #[test]
    fn test_binary_field_is_malformed() {
        let analyzer = RecordAnalyzer::new(fields(&["city"]));
        let doc = Document::builder()
            .add_field("city", FieldValue::Binary(vec![0xff]))
            .build();

        assert!(matches!(
            analyzer.analyze_record(&doc),
            Err(PulseRankError::MalformedInput(_))
        ));
    }
}
