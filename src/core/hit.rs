use serde::Serialize;

use crate::core::boundary::Boundary;
use crate::core::segment::{are_overlapping, SegmentRun};
use crate::core::types::{HitCategory, Score, ScoreKind};

/// A candidate match awaiting resolution: a footprint, a resolver score and a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateHit {
    run: SegmentRun,
    score: Score,
    label: String,
}

impl CandidateHit {
    /// A hit whose score is NaN is accepted here but never chosen by the resolver.
    pub fn new(run: SegmentRun, score: Score, label: impl Into<String>) -> Self {
        Self {
            run,
            score,
            label: label.into(),
        }
    }

    #[must_use]
    pub fn run(&self) -> &SegmentRun {
        &self.run
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn start(&self) -> Boundary {
        self.run.start()
    }

    #[must_use]
    pub fn stop(&self) -> Boundary {
        self.run.stop()
    }

    /// Whether the two hits share at least one residue
    #[must_use]
    pub fn overlaps(&self, other: &CandidateHit) -> bool {
        are_overlapping(&self.run, &other.run)
    }
}

impl std::fmt::Display for CandidateHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] score {}", self.label, self.run, self.score)
    }
}

/// A hit as delivered by an input reader, before filtering
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    /// Identity of the matching model/domain
    pub match_id: String,

    /// The score in its original units
    pub score: f64,

    /// Units of `score`
    pub score_kind: ScoreKind,

    /// Footprint on the query sequence
    pub run: SegmentRun,

    /// Fraction of the match's own model covered by the alignment, if known
    pub coverage: Option<f64>,
}

impl RawHit {
    pub fn new(
        match_id: impl Into<String>,
        score: f64,
        score_kind: ScoreKind,
        run: SegmentRun,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            score,
            score_kind,
            run,
            coverage: None,
        }
    }

    #[must_use]
    pub fn with_coverage(mut self, coverage: f64) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Score on the resolver's higher-is-better scale
    #[must_use]
    pub fn resolver_score(&self) -> Score {
        self.score_kind.to_score(self.score)
    }

    #[must_use]
    pub fn category(&self, apply_category_rules: bool) -> HitCategory {
        HitCategory::of_label(&self.match_id, apply_category_rules)
    }

    /// Convert into a candidate for resolution
    #[must_use]
    pub fn into_candidate(self) -> CandidateHit {
        let score = self.resolver_score();
        CandidateHit::new(self.run, score, self.match_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_overlap() {
        let a = CandidateHit::new("1-10".parse().unwrap(), Score::new(5.0), "a");
        let b = CandidateHit::new("8-20".parse().unwrap(), Score::new(5.0), "b");
        let c = CandidateHit::new("11-20".parse().unwrap(), Score::new(5.0), "c");
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.to_string(), "a [1-10] score 5");
    }

    #[test]
    fn test_raw_hit_into_candidate() {
        let raw = RawHit::new("m1", 1e-5, ScoreKind::Evalue, "3-40".parse().unwrap())
            .with_coverage(0.9);
        assert_eq!(raw.coverage, Some(0.9));
        let candidate = raw.into_candidate();
        assert_eq!(candidate.label(), "m1");
        assert!((candidate.score().value() - 5.0).abs() < 1e-9);
        assert_eq!(candidate.start(), Boundary::before(3));
        assert_eq!(candidate.stop(), Boundary::after(40));
    }
}
