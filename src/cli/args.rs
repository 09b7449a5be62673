//! Command line argument parsing for the pulse-rank CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// pulse-rank - BM25 ranking over CSV / JSON documents
#[derive(Parser, Debug, Clone)]
#[command(name = "pulse-rank")]
#[command(about = "BM25 ranking over small multi-field documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PulseRankArgs {
    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Settings file (JSON) with "search" and "pulse" sections
    #[arg(short, long, value_name = "CONFIG_FILE", env = "PULSE_RANK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PulseRankArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Rank the documents of a file for one query
    Search(SearchArgs),

    /// Show corpus statistics
    Stats(StatsArgs),

    /// Run every query of a file through the pulse scheduler
    Batch(BatchArgs),
}

/// Options shared by every command that builds an engine.
#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Document file (.csv, .json or .jsonl)
    #[arg(value_name = "DOCUMENTS")]
    pub documents: PathBuf,

    /// Fields to analyze, comma-separated (default: from settings)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// BM25 term-frequency saturation
    #[arg(long)]
    pub k1: Option<f64>,

    /// BM25 length normalization, within [0, 1]
    #[arg(long)]
    pub b: Option<f64>,
}

/// Arguments for searching
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of results to return (0 = all)
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Only show documents matching at least one query term
    #[arg(long)]
    pub hits_only: bool,
}

/// Arguments for corpus statistics
#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Number of terms to list, most frequent first
    #[arg(long, default_value = "10")]
    pub top_terms: usize,
}

/// Arguments for batch searching
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// File with one query per line
    #[arg(value_name = "QUERIES_FILE")]
    pub queries: PathBuf,

    /// Maximum number of hits per query (0 = all)
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Queries per pulse (default: from settings)
    #[arg(long)]
    pub pulse_size: Option<usize>,

    /// Queries running at the same time (default: from settings)
    #[arg(long)]
    pub max_concurrency: Option<usize>,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
