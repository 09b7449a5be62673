//! Output formatting for CLI commands.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;

use crate::cli::args::{OutputFormat, PulseRankArgs};
use crate::error::Result;
use crate::pulse::metrics::SchedulerStats;

/// One ranked document.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutput {
    pub rank: usize,
    pub doc_index: usize,
    pub score: f64,
    /// Text of the analyzed fields.
    pub fields: BTreeMap<String, String>,
}

/// Result structure for search operations.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub tokens: Vec<String>,
    pub total_documents: usize,
    pub total_hits: usize,
    pub matches: Vec<MatchOutput>,
    pub duration_ms: u64,
}

/// One term of the corpus vocabulary.
#[derive(Debug, Clone, Serialize)]
pub struct TermOutput {
    pub term: String,
    pub document_frequency: u64,
    pub idf: f64,
}

/// Corpus statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStatsOutput {
    pub documents: u64,
    pub fields: Vec<String>,
    pub total_tokens: u64,
    pub average_document_length: f64,
    pub vocabulary_size: usize,
    pub top_terms: Vec<TermOutput>,
}

/// Result of one query in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchQueryOutput {
    pub query: String,
    pub matches: Vec<MatchOutput>,
    /// Set when the query failed; `matches` is then empty.
    pub error: Option<String>,
}

/// Result structure for batch searches.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    pub queries: Vec<BatchQueryOutput>,
    pub stats: SchedulerStats,
}

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl HumanOutput for SearchOutput {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Search Results:")?;
        writeln!(out, "═══════════════")?;
        write_matches(out, &self.matches)?;
        writeln!(out)?;
        writeln!(
            out,
            "Total hits: {} of {} documents",
            self.total_hits, self.total_documents
        )?;
        writeln!(out, "Search time: {}ms", self.duration_ms)
    }
}

impl HumanOutput for CorpusStatsOutput {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Corpus Statistics:")?;
        writeln!(out, "══════════════════")?;
        writeln!(out, "Documents: {}", self.documents)?;
        writeln!(out, "Fields: {}", self.fields.join(", "))?;
        writeln!(out, "Total tokens: {}", self.total_tokens)?;
        writeln!(
            out,
            "Average document length: {:.2}",
            self.average_document_length
        )?;
        writeln!(out, "Vocabulary size: {}", self.vocabulary_size)?;

        if !self.top_terms.is_empty() {
            writeln!(out)?;
            writeln!(out, "Most frequent terms:")?;
            writeln!(out, "────────────────────")?;
            for term in &self.top_terms {
                writeln!(
                    out,
                    "  {:<20} df={:<6} idf={:.4}",
                    term.term, term.document_frequency, term.idf
                )?;
            }
        }
        Ok(())
    }
}

impl HumanOutput for BatchOutput {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Batch Results:")?;
        writeln!(out, "══════════════")?;
        for query in &self.queries {
            writeln!(out)?;
            writeln!(out, "Query: {}", query.query)?;
            writeln!(out, "─────────────")?;
            match &query.error {
                Some(error) => writeln!(out, "  failed: {error}")?,
                None if query.matches.is_empty() => writeln!(out, "  no matches")?,
                None => write_matches(out, &query.matches)?,
            }
        }

        let stats = &self.stats;
        writeln!(out)?;
        writeln!(
            out,
            "Queries: {} ({} ok, {} failed, {} cancelled)",
            stats.units_total, stats.units_succeeded, stats.units_failed, stats.units_cancelled
        )?;
        writeln!(
            out,
            "Pulses: {}, peak concurrency: {}",
            stats.pulses_completed, stats.peak_active
        )?;
        writeln!(out, "Elapsed: {}ms", stats.elapsed.as_millis())
    }
}

fn write_matches(out: &mut dyn Write, matches: &[MatchOutput]) -> io::Result<()> {
    for m in matches {
        writeln!(out)?;
        writeln!(
            out,
            "Result {}: document {} (Score: {:.3})",
            m.rank, m.doc_index, m.score
        )?;
        for (field_name, text) in &m.fields {
            writeln!(out, "  {field_name}: {text}")?;
        }
    }
    Ok(())
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &PulseRankArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: HumanOutput>(message: &str, result: &T, args: &PulseRankArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.verbosity() > 1 {
        writeln!(out, "{message}")?;
        writeln!(out)?;
    }
    result.write_human(&mut out)?;
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &PulseRankArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}
