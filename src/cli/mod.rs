//! Command-line interface for resolve-hits.
//!
//! Available commands:
//!
//! - **resolve**: Resolve each query's hits and write the chosen hits
//! - **summarize**: Resolve each query's hits and write one summary row per query
//!
//! ## Usage
//!
//! ```text
//! # Resolve a table of e-value scored hits
//! resolve-hits resolve hits.txt
//!
//! # Bit-scores from stdin, grouped by query, with trimmed boundaries
//! cat hits.txt | resolve-hits resolve - --score-kind bitscore \
//!     --input-order grouped --output-trimmed-boundaries
//!
//! # Descriptive output
//! resolve-hits resolve hits.txt.gz --format verbose
//!
//! # Per-query summary as JSON
//! resolve-hits summarize hits.txt --format json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rayon::ThreadPoolBuilder;
use tracing::warn;

use crate::core::types::ScoreKind;
use crate::output::format::HitOutputFormat;
use crate::parsing::hits::{open_input, HitReader};
use crate::pipeline::{HitPipeline, HitsProcessor, InputOrder, SubmitOutcome};
use crate::resolve::filter::{FilterSpec, Rejection};
use crate::utils::config::ResolveConfig;

pub mod resolve;
pub mod summarize;

#[derive(Parser)]
#[command(name = "resolve-hits")]
#[command(version)]
#[command(about = "Resolve overlapping sequence hits into the best-scoring non-overlapping set")]
#[command(
    long_about = "resolve-hits takes candidate matches (hits) against query sequences and, for each query, finds the set of mutually non-overlapping hits with the highest total score.\n\nHits may be discontiguous; a hit can sit inside the gap of a discontiguous hit. Optionally, reported boundaries are trimmed clear of small overlaps with the hits that were not chosen."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (defaults to the config file's, or compact)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve each query's hits and write the chosen hits
    Resolve(resolve::ResolveArgs),

    /// Resolve each query's hits and write a summary table
    Summarize(summarize::SummarizeArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Compact,
    Verbose,
    Json,
}

impl From<OutputFormat> for HitOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Compact => HitOutputFormat::Compact,
            OutputFormat::Verbose => HitOutputFormat::Verbose,
            OutputFormat::Json => HitOutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ScoreKindArg {
    /// E-values (lower is better)
    Evalue,
    /// Bit-scores (higher is better)
    Bitscore,
    /// Scores that are already additive and higher-is-better
    CrhScore,
}

impl From<ScoreKindArg> for ScoreKind {
    fn from(kind: ScoreKindArg) -> Self {
        match kind {
            ScoreKindArg::Evalue => ScoreKind::Evalue,
            ScoreKindArg::Bitscore => ScoreKind::Bitscore,
            ScoreKindArg::CrhScore => ScoreKind::CrhScore,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum InputOrderArg {
    /// All hits for a query are on consecutive lines
    Grouped,
    /// Hits for different queries may be mixed
    Interleaved,
}

impl From<InputOrderArg> for InputOrder {
    fn from(order: InputOrderArg) -> Self {
        match order {
            InputOrderArg::Grouped => InputOrder::Grouped,
            InputOrderArg::Interleaved => InputOrder::Interleaved,
        }
    }
}

/// Options shared by every command that reads hits
#[derive(Args)]
pub struct InputArgs {
    /// Hit table to read ('-' for stdin; .gz files are decompressed)
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Units of the score column
    #[arg(long, value_enum, default_value = "evalue")]
    pub score_kind: ScoreKindArg,

    /// Whether each query's hits are on consecutive lines (overrides the config file)
    #[arg(long, value_enum)]
    pub input_order: Option<InputOrderArg>,

    /// JSON config file; explicit options override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of threads used to resolve queries (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Ignore e-value hits with an e-value worse (higher) than this [default: 0.001]
    #[arg(long)]
    pub worst_permissible_evalue: Option<f64>,

    /// Ignore bit-score hits with a bit-score worse (lower) than this [default: 10]
    #[arg(long)]
    pub worst_permissible_bitscore: Option<f64>,

    /// Ignore hits whose converted score is lower than this
    #[arg(long)]
    pub worst_permissible_score: Option<f64>,

    /// Only process this query (may be repeated)
    #[arg(long = "filter-query-id")]
    pub filter_query_ids: Vec<String>,

    /// Only process the first N distinct queries
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit_queries: Option<u64>,

    /// Ignore hits covering less than this fraction of their model
    #[arg(long, value_parser = parse_fraction)]
    pub min_coverage: Option<f64>,

    /// Ignore discontinuous-chopping hits covering less than this fraction of their model
    #[arg(long, value_parser = parse_fraction)]
    pub min_dc_coverage: Option<f64>,

    /// Treat every hit as a normal hit, whatever its match label
    #[arg(long)]
    pub no_category_rules: bool,
}

impl FilterArgs {
    /// Override `spec` with the options given on the command line
    pub fn apply_to(&self, spec: &mut FilterSpec) {
        if let Some(evalue) = self.worst_permissible_evalue {
            spec.worst_permissible_evalue = Some(evalue);
        }
        if let Some(bitscore) = self.worst_permissible_bitscore {
            spec.worst_permissible_bitscore = Some(bitscore);
        }
        if let Some(score) = self.worst_permissible_score {
            spec.worst_permissible_score = Some(score);
        }
        if !self.filter_query_ids.is_empty() {
            spec.filter_query_ids.clone_from(&self.filter_query_ids);
        }
        if let Some(limit) = self.limit_queries {
            spec.limit_queries = Some(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        if let Some(coverage) = self.min_coverage {
            spec.min_coverage = Some(coverage);
        }
        if let Some(coverage) = self.min_dc_coverage {
            spec.min_dc_coverage = Some(coverage);
        }
        if self.no_category_rules {
            spec.apply_category_rules = false;
        }
    }
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not between 0 and 1"))
    }
}

impl InputArgs {
    /// The config file (or defaults) with command-line overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded.
    pub fn load_config(&self) -> anyhow::Result<ResolveConfig> {
        let mut config = match &self.config {
            Some(path) => ResolveConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ResolveConfig::default(),
        };
        self.filter.apply_to(&mut config.filter);
        if let Some(order) = self.input_order {
            config.input_order = order.into();
        }
        Ok(config)
    }
}

/// Read every hit from the input through a pipeline feeding `processor`, and
/// return the processor once all queries have been emitted
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or results cannot be
/// written.
pub fn process_input(
    input: &InputArgs,
    config: &ResolveConfig,
    processor: HitsProcessor,
) -> anyhow::Result<HitsProcessor> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(input.threads.unwrap_or(0))
        .build()?;

    pool.install(|| {
        let reader = open_input(&input.input)
            .with_context(|| format!("Failed to open {}", input.input.display()))?;
        let mut pipeline = HitPipeline::new(config.pipeline_config(), processor);
        let grouped = config.input_order == InputOrder::Grouped;

        let mut records = HitReader::new(reader, input.score_kind.into());
        for record in records.by_ref() {
            let record = record?;
            let outcome = pipeline.submit(&record.query_id, record.hit)?;

            // Every admitted query of a grouped stream is complete by now
            if grouped && matches!(outcome, SubmitOutcome::Rejected(Rejection::QueryLimitReached(_)))
            {
                break;
            }
        }
        if records.skipped() > 0 {
            warn!("Skipped {} hits with invalid boundaries", records.skipped());
        }

        Ok(pipeline.finish()?)
    })
}
