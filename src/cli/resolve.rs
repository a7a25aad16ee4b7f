use std::io::BufWriter;

use clap::Args;

use crate::cli::{process_input, InputArgs, OutputFormat};
use crate::core::types::ScoreKind;
use crate::output::format::BoundaryOutput;
use crate::pipeline::HitsProcessor;
use crate::resolve::trim::TrimSpec;

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// How much of a segment may be trimmed, as <full_length>/<total_trimming>:
    /// segments at least full_length long may lose total_trimming residues,
    /// shorter segments proportionally fewer [default: 30/10]
    #[arg(long)]
    pub overlap_trim_spec: Option<TrimSpec>,

    /// Report boundaries trimmed clear of overlapping hits that weren't chosen
    #[arg(long)]
    pub output_trimmed_boundaries: bool,
}

/// Execute resolve subcommand
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the results
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ResolveArgs, format: Option<OutputFormat>, verbose: bool) -> anyhow::Result<()> {
    let mut config = args.input.load_config()?;
    if let Some(spec) = args.overlap_trim_spec {
        config.trim = spec;
    }
    if args.output_trimmed_boundaries {
        config.output.boundaries = BoundaryOutput::Trimmed;
    }
    if let Some(format) = format {
        config.output.format = format.into();
    }

    if verbose {
        eprintln!(
            "Resolving {} ({} scores, {:?} output, trim spec {})",
            args.input.input.display(),
            ScoreKind::from(args.input.score_kind),
            config.output.format,
            config.trim,
        );
    }

    let processor = HitsProcessor::write_results(
        BufWriter::new(std::io::stdout()),
        config.output.format,
        config.output.boundaries,
    );
    process_input(&args.input, &config, processor)?;
    Ok(())
}
