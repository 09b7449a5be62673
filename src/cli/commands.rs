//! Command implementations for the pulse-rank CLI.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::EngineSettings;
use crate::document::converter::load_documents;
use crate::document::document::Document;
use crate::error::{PulseRankError, Result};
use crate::lexical::config::SearchConfig;
use crate::lexical::engine::Bm25Engine;
use crate::lexical::types::ScoredMatch;
use crate::pulse::scheduler::PulseScheduler;
use crate::pulse::unit::UnitOutcome;

/// Execute a CLI command.
pub fn execute_command(args: PulseRankArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    match &args.command {
        Command::Search(search_args) => search_documents(search_args, &settings, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &settings, &args),
        Command::Batch(batch_args) => batch_search(batch_args, &settings, &args),
    }
}

fn load_settings(args: &PulseRankArgs) -> Result<EngineSettings> {
    match &args.config {
        Some(path) => EngineSettings::from_json_file(path),
        None => Ok(EngineSettings::default()),
    }
}

/// Settings overridden by command line flags.
pub fn search_config(corpus: &CorpusArgs, settings: &EngineSettings) -> SearchConfig {
    let mut config = settings.search.clone();
    if !corpus.fields.is_empty() {
        config.fields = corpus.fields.clone();
    }
    if let Some(k1) = corpus.k1 {
        config.bm25.k1 = k1;
    }
    if let Some(b) = corpus.b {
        config.bm25.b = b;
    }
    config
}

/// Load the documents of `corpus` and build an engine over them.
pub fn build_engine(
    corpus: &CorpusArgs,
    settings: &EngineSettings,
) -> Result<(Vec<Document>, Bm25Engine)> {
    let config = search_config(corpus, settings);
    config.validate()?;

    let documents = load_documents(&corpus.documents)?;
    let engine = Bm25Engine::build(&documents, config)?;
    Ok((documents, engine))
}

fn match_output(
    documents: &[Document],
    fields: &[String],
    rank: usize,
    m: &ScoredMatch,
) -> Result<MatchOutput> {
    let mut field_texts = BTreeMap::new();
    if let Some(doc) = documents.get(m.doc_index) {
        for field in fields {
            field_texts.insert(field.clone(), doc.field_text(field)?);
        }
    }
    Ok(MatchOutput {
        rank,
        doc_index: m.doc_index,
        score: m.score,
        fields: field_texts,
    })
}

fn match_outputs(
    documents: &[Document],
    fields: &[String],
    matches: &[ScoredMatch],
) -> Result<Vec<MatchOutput>> {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| match_output(documents, fields, i + 1, m))
        .collect()
}

/// Rank every document for one query.
fn search_documents(
    args: &SearchArgs,
    settings: &EngineSettings,
    cli_args: &PulseRankArgs,
) -> Result<()> {
    let (documents, engine) = build_engine(&args.corpus, settings)?;

    let start = Instant::now();
    let tokens = engine.tokenize_query(&args.query)?;
    let mut matches = engine.search_tokens(&tokens)?;
    let total_hits = matches.iter().filter(|m| m.is_hit()).count();
    if args.hits_only {
        matches.retain(ScoredMatch::is_hit);
    }
    if args.limit > 0 {
        matches.truncate(args.limit);
    }
    let duration_ms = start.elapsed().as_millis() as u64;
    debug!("query {:?} -> tokens {:?}", args.query, tokens);

    let output = SearchOutput {
        query: args.query.clone(),
        tokens,
        total_documents: engine.len(),
        total_hits,
        matches: match_outputs(&documents, &engine.config().fields, &matches)?,
        duration_ms,
    };
    output_result("Search completed", &output, cli_args)
}

/// Show corpus statistics.
fn show_stats(args: &StatsArgs, settings: &EngineSettings, cli_args: &PulseRankArgs) -> Result<()> {
    let (_, engine) = build_engine(&args.corpus, settings)?;
    let stats = engine.stats();

    let mut terms: Vec<TermOutput> = stats
        .idf_entries()
        .map(|(term, idf)| TermOutput {
            term: term.to_string(),
            document_frequency: stats.document_frequency(term),
            idf,
        })
        .collect();
    terms.sort_by(|a, b| {
        b.document_frequency
            .cmp(&a.document_frequency)
            .then_with(|| a.term.cmp(&b.term))
    });
    terms.truncate(args.top_terms);

    let output = CorpusStatsOutput {
        documents: stats.doc_count(),
        fields: engine.config().fields.clone(),
        total_tokens: stats.total_tokens(),
        average_document_length: stats.average_document_length(),
        vocabulary_size: stats.vocabulary_size(),
        top_terms: terms,
    };
    output_result("Corpus statistics", &output, cli_args)
}

/// Read one query per line, skipping blank lines.
pub fn read_queries<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path.as_ref())?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Run every query of a file through the pulse scheduler.
fn batch_search(args: &BatchArgs, settings: &EngineSettings, cli_args: &PulseRankArgs) -> Result<()> {
    let mut pulse_config = settings.pulse;
    if let Some(pulse_size) = args.pulse_size {
        pulse_config.pulse_size = pulse_size;
    }
    if let Some(max_concurrency) = args.max_concurrency {
        pulse_config.max_concurrency = max_concurrency;
    }
    let scheduler = PulseScheduler::new(pulse_config)?;

    let queries = read_queries(&args.queries)?;
    let (documents, engine) = build_engine(&args.corpus, settings)?;
    let engine = Arc::new(engine);
    info!(
        "running {} queries over {} documents",
        queries.len(),
        engine.len()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("pulse-rank-batch")
        .build()?;

    let limit = args.limit;
    let report = {
        let engine = Arc::clone(&engine);
        runtime.block_on(scheduler.run(queries.clone(), move |query: String| {
            let engine = Arc::clone(&engine);
            async move {
                tokio::task::spawn_blocking(move || match limit {
                    0 => engine.search_hits(&query),
                    k => engine.top_k(&query, k),
                })
                    .await
                    .map_err(|e| PulseRankError::internal(format!("search task failed: {e}")))?
            }
        }))
    };

    let fields = &engine.config().fields;
    let results = queries
        .into_iter()
        .zip(report.outcomes)
        .map(|(query, outcome)| match outcome {
            UnitOutcome::Completed(matches) => Ok(BatchQueryOutput {
                query,
                matches: match_outputs(&documents, fields, &matches)?,
                error: None,
            }),
            UnitOutcome::Failed(failure) => Ok(BatchQueryOutput {
                query,
                matches: Vec::new(),
                error: Some(failure.message),
            }),
            UnitOutcome::Cancelled => Ok(BatchQueryOutput {
                query,
                matches: Vec::new(),
                error: Some("cancelled".to_string()),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    let output = BatchOutput {
        queries: results,
        stats: report.stats,
    };
    output_result("Batch completed", &output, cli_args)
}
