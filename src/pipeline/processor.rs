use std::fmt;
use std::io::Write;

use serde::Serialize;

use crate::core::hit::CandidateHit;
use crate::core::types::Score;
use crate::output::format::{to_output_string, BoundaryOutput, HitOutputFormat};
use crate::resolve::architecture::ScoredArchitecture;
use crate::resolve::trim::TrimSpec;

/// Layout of the table written by [`HitsProcessor::Summarize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFormat {
    #[default]
    Tsv,
    Json,
}

/// Per-query figures collected by [`HitsProcessor::Summarize`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySummary {
    pub query_id: String,
    /// Hits that passed the filter
    pub candidate_hits: usize,
    /// Hits in the resolved architecture
    pub resolved_hits: usize,
    pub total_score: Score,
    /// Residues covered by the resolved hits
    pub residues_covered: u32,
}

impl QuerySummary {
    #[must_use]
    pub fn new(query_id: &str, input_hits: &[CandidateHit], scored: &ScoredArchitecture) -> Self {
        Self {
            query_id: query_id.to_string(),
            candidate_hits: input_hits.len(),
            resolved_hits: scored.architecture().len(),
            total_score: scored.score(),
            residues_covered: scored
                .architecture()
                .iter()
                .map(|hit| hit.run().total_length())
                .sum(),
        }
    }
}

/// What to do with each query's resolved architecture
pub enum HitsProcessor {
    /// Format the results and write them to a sink as each query completes
    WriteResults {
        sink: Box<dyn Write + Send>,
        format: HitOutputFormat,
        boundaries: BoundaryOutput,
    },
    /// Collect a summary per query and write them as a table when work finishes
    Summarize {
        sink: Box<dyn Write + Send>,
        format: SummaryFormat,
        summaries: Vec<QuerySummary>,
    },
    /// Resolve and drop the results
    Discard,
}

impl HitsProcessor {
    pub fn write_results(
        sink: impl Write + Send + 'static,
        format: HitOutputFormat,
        boundaries: BoundaryOutput,
    ) -> Self {
        Self::WriteResults {
            sink: Box::new(sink),
            format,
            boundaries,
        }
    }

    pub fn summarize(sink: impl Write + Send + 'static, format: SummaryFormat) -> Self {
        Self::Summarize {
            sink: Box::new(sink),
            format,
            summaries: Vec::new(),
        }
    }

    /// Handle one query's result
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing to the sink fails.
    pub fn process_query(
        &mut self,
        query_id: &str,
        input_hits: &[CandidateHit],
        scored: &ScoredArchitecture,
        trim: &TrimSpec,
    ) -> std::io::Result<()> {
        match self {
            Self::WriteResults {
                sink,
                format,
                boundaries,
            } => {
                let trim = match boundaries {
                    BoundaryOutput::Original => None,
                    BoundaryOutput::Trimmed => Some(trim),
                };
                let text = to_output_string(query_id, scored, input_hits, *format, trim);
                sink.write_all(text.as_bytes())
            }
            Self::Summarize { summaries, .. } => {
                summaries.push(QuerySummary::new(query_id, input_hits, scored));
                Ok(())
            }
            Self::Discard => Ok(()),
        }
    }

    /// Complete the batch of work: write any summary table and flush the sink
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing to the sink fails.
    pub fn finish_work(&mut self) -> std::io::Result<()> {
        match self {
            Self::WriteResults { sink, .. } => sink.flush(),
            Self::Summarize {
                sink,
                format,
                summaries,
            } => {
                match format {
                    SummaryFormat::Tsv => write_summary_tsv(&mut **sink, summaries)?,
                    SummaryFormat::Json => {
                        serde_json::to_writer_pretty(&mut *sink, summaries)?;
                        writeln!(sink)?;
                    }
                }
                sink.flush()
            }
            Self::Discard => Ok(()),
        }
    }

    /// Summaries collected so far (empty unless summarizing)
    #[must_use]
    pub fn summaries(&self) -> &[QuerySummary] {
        match self {
            Self::Summarize { summaries, .. } => summaries,
            _ => &[],
        }
    }
}

impl fmt::Debug for HitsProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteResults {
                format, boundaries, ..
            } => f
                .debug_struct("WriteResults")
                .field("format", format)
                .field("boundaries", boundaries)
                .finish_non_exhaustive(),
            Self::Summarize {
                format, summaries, ..
            } => f
                .debug_struct("Summarize")
                .field("format", format)
                .field("summaries", &summaries.len())
                .finish_non_exhaustive(),
            Self::Discard => f.write_str("Discard"),
        }
    }
}

fn write_summary_tsv(sink: &mut dyn Write, summaries: &[QuerySummary]) -> std::io::Result<()> {
    writeln!(
        sink,
        "query_id\tcandidate_hits\tresolved_hits\ttotal_score\tresidues_covered"
    )?;
    for summary in summaries {
        writeln!(
            sink,
            "{}\t{}\t{}\t{}\t{}",
            summary.query_id,
            summary.candidate_hits,
            summary.resolved_hits,
            summary.total_score,
            summary.residues_covered
        )?;
    }
    Ok(())
}
