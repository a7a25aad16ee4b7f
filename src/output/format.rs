use serde::{Deserialize, Serialize};

use crate::core::hit::CandidateHit;
use crate::core::segment::SegmentRun;
use crate::resolve::architecture::ScoredArchitecture;
use crate::resolve::trim::{trim_architecture, TrimOutcome, TrimSpec, TrimmedHit};

/// Layout of the resolved hits written for each query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitOutputFormat {
    /// One tab-separated line per resolved hit
    #[default]
    Compact,
    /// A header per query and a descriptive line per hit
    Verbose,
    /// One JSON object per query, one query per line
    Json,
}

/// Which boundaries to report for each resolved hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryOutput {
    /// The hit's boundaries as input
    #[default]
    Original,
    /// Boundaries trimmed clear of overlapping discarded hits
    Trimmed,
}

/// Render one query's resolved architecture.
///
/// `input_hits` are only consulted when `trim` is given, in which case the
/// reported boundaries are trimmed clear of them.
#[must_use]
pub fn to_output_string(
    query_id: &str,
    scored: &ScoredArchitecture,
    input_hits: &[CandidateHit],
    format: HitOutputFormat,
    trim: Option<&TrimSpec>,
) -> String {
    let reported: Vec<TrimmedHit> = match trim {
        Some(spec) => trim_architecture(scored.architecture(), input_hits, spec),
        None => scored
            .architecture()
            .iter()
            .map(|hit| TrimmedHit::untrimmed(hit, TrimOutcome::NotNeeded))
            .collect(),
    };
    let trimmed = trim.is_some();

    match format {
        HitOutputFormat::Compact => compact(query_id, &reported, trimmed),
        HitOutputFormat::Verbose => verbose(query_id, scored, &reported, trimmed),
        HitOutputFormat::Json => json(query_id, scored, &reported, trimmed),
    }
}

fn compact(query_id: &str, reported: &[TrimmedHit], trimmed: bool) -> String {
    let mut out = String::new();
    for entry in reported {
        let hit = entry.hit();
        out.push_str(&format!(
            "{query_id}\t{}\t{}\t{}",
            hit.label(),
            hit.score(),
            entry.reported_run()
        ));
        if trimmed {
            out.push('\t');
            out.push_str(trim_column(entry.outcome()));
        }
        out.push('\n');
    }
    out
}

fn trim_column(outcome: TrimOutcome) -> &'static str {
    if outcome.is_clear() {
        "trimmed"
    } else {
        "untrimmed"
    }
}

fn verbose(
    query_id: &str,
    scored: &ScoredArchitecture,
    reported: &[TrimmedHit],
    trimmed: bool,
) -> String {
    let plural = if reported.len() == 1 { "" } else { "s" };
    let mut out = format!(
        "Query {query_id}: {} hit{plural} resolved, total score {}\n",
        reported.len(),
        scored.score()
    );
    for entry in reported {
        let hit = entry.hit();
        let run = entry.reported_run();
        out.push_str(&format!(
            "  {:<30} {:<24} score {:<12} ({} segment{}, {} residues)",
            hit.label(),
            run.to_string(),
            hit.score().to_string(),
            run.num_segments(),
            if run.num_segments() == 1 { "" } else { "s" },
            run.total_length(),
        ));
        if trimmed {
            match entry.outcome() {
                TrimOutcome::NotNeeded => {}
                TrimOutcome::Trimmed => out.push_str(&format!(" trimmed from {}", hit.run())),
                TrimOutcome::Insufficient => out.push_str(" [trimming insufficient]"),
            }
        }
        out.push('\n');
    }
    out
}

fn json(
    query_id: &str,
    scored: &ScoredArchitecture,
    reported: &[TrimmedHit],
    trimmed: bool,
) -> String {
    let hits: Vec<serde_json::Value> = reported
        .iter()
        .map(|entry| {
            let hit = entry.hit();
            let mut value = serde_json::json!({
                "match_id": hit.label(),
                "score": hit.score().value(),
                "boundaries": entry.reported_run().to_string(),
                "segments": residue_ranges(entry.reported_run()),
            });
            if trimmed {
                value["original_boundaries"] = hit.run().to_string().into();
                value["trim_outcome"] = serde_json::json!(entry.outcome());
            }
            value
        })
        .collect();

    let output = serde_json::json!({
        "query_id": query_id,
        "score": scored.score().value(),
        "hits": hits,
    });
    format!("{output}\n")
}

/// Inclusive `[first, last]` residue pairs of each segment
fn residue_ranges(run: &SegmentRun) -> Vec<[u32; 2]> {
    run.segments()
        .map(|segment| [segment.start().res_after(), segment.stop().res_before()])
        .collect()
}
