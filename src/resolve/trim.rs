//! Trimming of reported boundaries.
//!
//! A resolved hit often overlaps, by a few residues, hits that lost out to it. When
//! trimmed boundaries are requested, each segment of a resolved hit is shortened at
//! whichever end a discarded neighbour covers, so that the reported boundaries
//! no longer overlap any input hit. How much may be removed depends on the
//! segment's length (see [`TrimSpec::allowed_trim`]).
//!
//! Trimming only changes what gets reported: it never changes which hits were
//! selected or their scores.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::hit::CandidateHit;
use crate::core::segment::{any_interaction, Segment, SegmentRun};
use crate::resolve::architecture::Architecture;

pub const DEFAULT_FULL_LENGTH: u32 = 30;
pub const DEFAULT_TOTAL_TRIMMING: u32 = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrimSpecError {
    #[error("Invalid trim spec '{0}': expected <full_length>/<total_trimming>, e.g. 30/10")]
    InvalidFormat(String),

    #[error("Trim spec full length must be greater than zero")]
    ZeroFullLength,

    #[error("Trim spec total trimming {total_trimming} exceeds its full length {full_length}")]
    TrimmingExceedsLength { full_length: u32, total_trimming: u32 },
}

/// How many residues may be trimmed from a segment, as a function of its length
///
/// A segment at least `full_length` long may lose up to `total_trimming` residues
/// in total (split between its two ends as needed); a shorter segment may lose a
/// proportional amount, rounded down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimSpec {
    full_length: u32,
    total_trimming: u32,
}

impl Default for TrimSpec {
    fn default() -> Self {
        Self {
            full_length: DEFAULT_FULL_LENGTH,
            total_trimming: DEFAULT_TOTAL_TRIMMING,
        }
    }
}

impl TrimSpec {
    /// # Errors
    ///
    /// Returns a `TrimSpecError` if `full_length` is zero or `total_trimming`
    /// exceeds it.
    pub fn new(full_length: u32, total_trimming: u32) -> Result<Self, TrimSpecError> {
        if full_length == 0 {
            return Err(TrimSpecError::ZeroFullLength);
        }
        if total_trimming > full_length {
            return Err(TrimSpecError::TrimmingExceedsLength {
                full_length,
                total_trimming,
            });
        }
        Ok(Self {
            full_length,
            total_trimming,
        })
    }

    /// A spec that never trims
    #[must_use]
    pub fn no_trimming() -> Self {
        Self {
            full_length: DEFAULT_FULL_LENGTH,
            total_trimming: 0,
        }
    }

    #[must_use]
    pub fn full_length(&self) -> u32 {
        self.full_length
    }

    #[must_use]
    pub fn total_trimming(&self) -> u32 {
        self.total_trimming
    }

    /// Maximum residues that may be trimmed from a segment of `length` residues
    #[must_use]
    pub fn allowed_trim(&self, length: u32) -> u32 {
        if length >= self.full_length {
            return self.total_trimming;
        }
        let scaled =
            u64::from(length) * u64::from(self.total_trimming) / u64::from(self.full_length);
        // scaled < total_trimming here, so it fits
        u32::try_from(scaled).unwrap_or(self.total_trimming)
    }
}

impl std::fmt::Display for TrimSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.full_length, self.total_trimming)
    }
}

impl std::str::FromStr for TrimSpec {
    type Err = TrimSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TrimSpecError::InvalidFormat(s.to_string());
        let (full_length, total_trimming) = s.trim().split_once('/').ok_or_else(invalid)?;
        let full_length = full_length.trim().parse().map_err(|_| invalid())?;
        let total_trimming = total_trimming.trim().parse().map_err(|_| invalid())?;
        Self::new(full_length, total_trimming)
    }
}

/// What trimming did to a resolved hit's reported boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimOutcome {
    /// No discarded neighbour overlapped the hit
    NotNeeded,
    /// Boundaries were trimmed clear of every overlapping neighbour
    Trimmed,
    /// An overlap could not be removed within the allowed trim; boundaries are untrimmed
    Insufficient,
}

impl TrimOutcome {
    /// Whether the reported boundaries are free of overlaps with other input hits
    #[must_use]
    pub fn is_clear(self) -> bool {
        !matches!(self, Self::Insufficient)
    }
}

/// A resolved hit together with the boundaries to report for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrimmedHit {
    hit: CandidateHit,
    reported: SegmentRun,
    outcome: TrimOutcome,
}

impl TrimmedHit {
    pub(crate) fn untrimmed(hit: &CandidateHit, outcome: TrimOutcome) -> Self {
        Self {
            hit: hit.clone(),
            reported: hit.run().clone(),
            outcome,
        }
    }

    #[must_use]
    pub fn hit(&self) -> &CandidateHit {
        &self.hit
    }

    #[must_use]
    pub fn reported_run(&self) -> &SegmentRun {
        &self.reported
    }

    #[must_use]
    pub fn outcome(&self) -> TrimOutcome {
        self.outcome
    }
}

/// Trim each hit of `architecture` clear of the other hits in `input_hits`
///
/// `input_hits` should be every hit the architecture was resolved from; members
/// of the architecture itself are never trimmed against each other since they
/// don't overlap.
#[must_use]
pub fn trim_architecture(
    architecture: &Architecture,
    input_hits: &[CandidateHit],
    spec: &TrimSpec,
) -> Vec<TrimmedHit> {
    architecture
        .iter()
        .map(|hit| trim_hit(hit, input_hits, spec))
        .collect()
}

fn trim_hit(hit: &CandidateHit, input_hits: &[CandidateHit], spec: &TrimSpec) -> TrimmedHit {
    let neighbours: Vec<&CandidateHit> = input_hits
        .iter()
        .filter(|&other| other != hit && any_interaction(hit.run(), other.run()))
        .collect();
    if neighbours.is_empty() {
        return TrimmedHit::untrimmed(hit, TrimOutcome::NotNeeded);
    }

    let mut segments = Vec::with_capacity(hit.run().num_segments());
    for segment in hit.run().segments() {
        match trim_segment(&segment, &neighbours, spec) {
            Some(trimmed) => segments.push(trimmed),
            None => return TrimmedHit::untrimmed(hit, TrimOutcome::Insufficient),
        }
    }

    if segments.iter().copied().eq(hit.run().segments()) {
        return TrimmedHit::untrimmed(hit, TrimOutcome::NotNeeded);
    }
    match SegmentRun::from_segments(&segments) {
        Ok(reported) => TrimmedHit {
            hit: hit.clone(),
            reported,
            outcome: TrimOutcome::Trimmed,
        },
        Err(_) => TrimmedHit::untrimmed(hit, TrimOutcome::Insufficient),
    }
}

/// The segment trimmed clear of every neighbouring segment, or `None` if that
/// would need more than the allowed trim (or a neighbour overlaps its middle)
fn trim_segment(
    segment: &Segment,
    neighbours: &[&CandidateHit],
    spec: &TrimSpec,
) -> Option<Segment> {
    let mut start_trim = 0;
    let mut stop_trim = 0;

    for neighbour in neighbours {
        for other in neighbour.run().segments().filter(|o| o.overlaps(segment)) {
            let covers_start = other.start() <= segment.start();
            let covers_stop = other.stop() >= segment.stop();
            match (covers_start, covers_stop) {
                (true, false) => {
                    start_trim = start_trim.max(segment.start().residues_until(other.stop())?);
                }
                (false, true) => {
                    stop_trim = stop_trim.max(other.start().residues_until(segment.stop())?);
                }
                // Covers the whole segment, or sits strictly inside it
                _ => return None,
            }
        }
    }

    let total = start_trim + stop_trim;
    if total == 0 {
        return Some(*segment);
    }
    if total > spec.allowed_trim(segment.length()) || total >= segment.length() {
        return None;
    }
    Segment::new(
        segment.start().shifted_forward(start_trim),
        segment.stop().shifted_back(stop_trim),
    )
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Score;

    fn hit(bounds: &str, score: f64, label: &str) -> CandidateHit {
        CandidateHit::new(bounds.parse().unwrap(), Score::new(score), label)
    }

    fn trim_one(selected: &CandidateHit, others: &[CandidateHit], spec: &TrimSpec) -> TrimmedHit {
        let architecture = Architecture::new(vec![selected.clone()]).unwrap();
        let mut input = vec![selected.clone()];
        input.extend_from_slice(others);
        let mut trimmed = trim_architecture(&architecture, &input, spec);
        assert_eq!(trimmed.len(), 1);
        trimmed.remove(0)
    }

    #[test]
    fn test_parse_and_display() {
        let spec: TrimSpec = "30/10".parse().unwrap();
        assert_eq!(spec, TrimSpec::default());
        assert_eq!(spec.to_string(), "30/10");
        assert_eq!(" 50 / 5 ".parse::<TrimSpec>().unwrap().total_trimming(), 5);

        assert!(matches!(
            "30".parse::<TrimSpec>(),
            Err(TrimSpecError::InvalidFormat(_))
        ));
        assert!(matches!(
            "a/b".parse::<TrimSpec>(),
            Err(TrimSpecError::InvalidFormat(_))
        ));
        assert_eq!("0/0".parse::<TrimSpec>(), Err(TrimSpecError::ZeroFullLength));
        assert!(matches!(
            "10/20".parse::<TrimSpec>(),
            Err(TrimSpecError::TrimmingExceedsLength { .. })
        ));
    }

    #[test]
    fn test_allowed_trim_scales_below_full_length() {
        let spec = TrimSpec::default();
        assert_eq!(spec.allowed_trim(40), 10);
        assert_eq!(spec.allowed_trim(30), 10);
        assert_eq!(spec.allowed_trim(15), 5);
        assert_eq!(spec.allowed_trim(20), 6);
        assert_eq!(spec.allowed_trim(1), 0);
        assert_eq!(TrimSpec::no_trimming().allowed_trim(1000), 0);
    }

    #[test]
    fn test_no_neighbours_needs_no_trim() {
        let selected = hit("1-40", 10.0, "a");
        let trimmed = trim_one(&selected, &[hit("50-60", 1.0, "b")], &TrimSpec::default());
        assert_eq!(trimmed.outcome(), TrimOutcome::NotNeeded);
        assert_eq!(trimmed.reported_run(), selected.run());
    }

    #[test]
    fn test_small_overlap_at_stop_is_trimmed() {
        let selected = hit("1-40", 10.0, "a");
        let trimmed = trim_one(&selected, &[hit("35-60", 1.0, "b")], &TrimSpec::default());
        assert_eq!(trimmed.outcome(), TrimOutcome::Trimmed);
        assert_eq!(trimmed.reported_run().to_string(), "1-34");
        // The hit itself is untouched
        assert_eq!(trimmed.hit(), &selected);
    }

    #[test]
    fn test_both_ends_trimmed() {
        let selected = hit("11-50", 10.0, "a");
        let others = [hit("1-13", 1.0, "b"), hit("48-70", 1.0, "c")];
        let trimmed = trim_one(&selected, &others, &TrimSpec::default());
        assert_eq!(trimmed.outcome(), TrimOutcome::Trimmed);
        assert_eq!(trimmed.reported_run().to_string(), "14-47");
    }

    #[test]
    fn test_large_overlap_is_insufficient() {
        let selected = hit("1-40", 10.0, "a");
        let trimmed = trim_one(&selected, &[hit("25-60", 1.0, "b")], &TrimSpec::default());
        assert_eq!(trimmed.outcome(), TrimOutcome::Insufficient);
        assert!(!trimmed.outcome().is_clear());
        assert_eq!(trimmed.reported_run(), selected.run());
    }

    #[test]
    fn test_neighbour_inside_segment_is_insufficient() {
        let selected = hit("1-40", 10.0, "a");
        let trimmed = trim_one(&selected, &[hit("10-20", 1.0, "b")], &TrimSpec::default());
        assert_eq!(trimmed.outcome(), TrimOutcome::Insufficient);
    }

    #[test]
    fn test_zero_trimming_reports_any_overlap() {
        let selected = hit("1-40", 10.0, "a");
        let trimmed = trim_one(&selected, &[hit("40-60", 1.0, "b")], &TrimSpec::no_trimming());
        assert_eq!(trimmed.outcome(), TrimOutcome::Insufficient);
    }

    #[test]
    fn test_discontiguous_segments_trimmed_independently() {
        let selected = hit("1-20,41-60", 10.0, "a");
        // 55-60 is 6 residues; a 20-residue segment may lose floor(20 * 10 / 30) = 6
        let trimmed = trim_one(&selected, &[hit("55-70", 1.0, "b")], &TrimSpec::default());
        assert_eq!(trimmed.outcome(), TrimOutcome::Trimmed);
        assert_eq!(trimmed.reported_run().to_string(), "1-20,41-54");

        let too_far = trim_one(&selected, &[hit("54-70", 1.0, "b")], &TrimSpec::default());
        assert_eq!(too_far.outcome(), TrimOutcome::Insufficient);
    }

    #[test]
    fn test_neighbour_in_gap_needs_no_trim() {
        let selected = hit("1-20,41-60", 10.0, "a");
        let trimmed = trim_one(&selected, &[hit("25-35", 1.0, "b")], &TrimSpec::default());
        assert_eq!(trimmed.outcome(), TrimOutcome::NotNeeded);
    }
}
