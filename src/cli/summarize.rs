use std::io::BufWriter;

use clap::Args;

use crate::cli::{process_input, InputArgs, OutputFormat};
use crate::pipeline::{HitsProcessor, SummaryFormat};

#[derive(Args)]
pub struct SummarizeArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Execute summarize subcommand
///
/// Writes one row per query: hits that passed the filter, hits resolved, total
/// score and residues covered. `--format json` writes a JSON array instead of TSV.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the summary cannot
/// be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: SummarizeArgs,
    format: Option<OutputFormat>,
    verbose: bool,
) -> anyhow::Result<()> {
    let config = args.input.load_config()?;
    let summary_format = match format {
        Some(OutputFormat::Json) => SummaryFormat::Json,
        _ => SummaryFormat::Tsv,
    };

    let processor = HitsProcessor::summarize(BufWriter::new(std::io::stdout()), summary_format);
    let processor = process_input(&args.input, &config, processor)?;

    if verbose {
        let summaries = processor.summaries();
        let resolved: usize = summaries.iter().map(|s| s.resolved_hits).sum();
        let candidates: usize = summaries.iter().map(|s| s.candidate_hits).sum();
        eprintln!(
            "Summarized {} queries: {resolved} of {candidates} candidate hits resolved",
            summaries.len()
        );
    }
    Ok(())
}
