use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Resolver score of a hit, where higher is always better
///
/// Ordered with `f64::total_cmp`, so it can be used directly as a sort key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    pub const ZERO: Score = Score(0.0);

    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Score {
    fn sum<I: Iterator<Item = Score>>(iter: I) -> Score {
        iter.fold(Score::ZERO, |acc, s| acc + s)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolver score given to an e-value of exactly zero
pub const ZERO_EVALUE_SCORE: f64 = 400.0;

/// The kind of score attached to a raw hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    /// Expectation value: lower is better
    Evalue,
    /// Bit-score: higher is better
    Bitscore,
    /// A score already on the resolver's scale: higher is better
    CrhScore,
}

impl ScoreKind {
    /// Convert a raw value of this kind to a resolver score
    #[must_use]
    pub fn to_score(self, value: f64) -> Score {
        match self {
            Self::Evalue if value <= 0.0 => Score::new(ZERO_EVALUE_SCORE),
            Self::Evalue => Score::new(-value.log10()),
            Self::Bitscore | Self::CrhScore => Score::new(value),
        }
    }
}

impl std::fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evalue => write!(f, "evalue"),
            Self::Bitscore => write!(f, "bitscore"),
            Self::CrhScore => write!(f, "crh-score"),
        }
    }
}

/// Labels of discontinuous-chopping models: `dc_` followed by a 32 character digest
static DC_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^dc_\w{32}$").unwrap_or_else(|e| panic!("invalid dc label pattern: {e}"))
});

const DC_PREFIX: &str = "dc_";
const DC_LABEL_LEN: usize = 35;

/// Category of a match, used to pick the coverage threshold applied to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitCategory {
    #[default]
    Normal,
    /// Model built from a discontinuous chopping
    DiscontinuousChopping,
}

impl HitCategory {
    /// Categorise a match label, or return `Normal` if category rules are disabled
    #[must_use]
    pub fn of_label(label: &str, apply_category_rules: bool) -> Self {
        if apply_category_rules
            && label.len() == DC_LABEL_LEN
            && label.starts_with(DC_PREFIX)
            && DC_LABEL.is_match(label)
        {
            Self::DiscontinuousChopping
        } else {
            Self::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_ordering() {
        assert!(Score::new(7.0) > Score::new(3.0));
        assert_eq!(Score::new(2.5) + Score::new(0.5), Score::new(3.0));
        let total: Score = [1.0, 2.0, 3.0].into_iter().map(Score::new).sum();
        assert_eq!(total, Score::new(6.0));
    }

    #[test]
    fn test_score_kind_conversion() {
        assert!((ScoreKind::Evalue.to_score(1e-10).value() - 10.0).abs() < 1e-9);
        assert_eq!(ScoreKind::Evalue.to_score(0.0), Score::new(ZERO_EVALUE_SCORE));
        assert!(ScoreKind::Evalue.to_score(1e-3) > ScoreKind::Evalue.to_score(1e-2));
        assert_eq!(ScoreKind::Bitscore.to_score(42.5), Score::new(42.5));
        assert_eq!(ScoreKind::CrhScore.to_score(-1.0), Score::new(-1.0));
    }

    #[test]
    fn test_hit_category() {
        let dc = "dc_0123456789abcdef0123456789abcdef";
        assert_eq!(
            HitCategory::of_label(dc, true),
            HitCategory::DiscontinuousChopping
        );
        assert_eq!(HitCategory::of_label(dc, false), HitCategory::Normal);
        assert_eq!(
            HitCategory::of_label("1cukA01__1/2", true),
            HitCategory::Normal
        );
        // Right prefix, wrong length
        assert_eq!(
            HitCategory::of_label("dc_0123456789abcdef", true),
            HitCategory::Normal
        );
        // Right length, not a word character
        assert_eq!(
            HitCategory::of_label("dc_0123456789abcdef0123456789abcde-", true),
            HitCategory::Normal
        );
    }
}
