use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::hit::RawHit;
use crate::core::types::{HitCategory, ScoreKind};

/// Default worst permissible e-value
pub const DEFAULT_WORST_PERMISSIBLE_EVALUE: f64 = 0.001;

/// Default worst permissible bit-score
pub const DEFAULT_WORST_PERMISSIBLE_BITSCORE: f64 = 10.0;

/// Why a hit or query was not passed on to the resolver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("{kind} {value} is worse than the worst permissible {threshold}")]
    Score {
        kind: ScoreKind,
        value: f64,
        threshold: f64,
    },

    #[error("Coverage {coverage} is below the minimum {minimum}")]
    Coverage { coverage: f64, minimum: f64 },

    #[error("Query {0} is not in the list of queries to process")]
    QueryNotAllowed(String),

    #[error("Query {0} exceeds the limit on the number of distinct queries")]
    QueryLimitReached(String),
}

/// Thresholds that decide which hits reach the resolver.
///
/// All fields are optional in a configuration file; missing fields take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Reject e-value hits with an e-value above this
    pub worst_permissible_evalue: Option<f64>,

    /// Reject bit-score hits with a bit-score below this
    pub worst_permissible_bitscore: Option<f64>,

    /// Reject any hit whose resolver score is below this
    pub worst_permissible_score: Option<f64>,

    /// Only process these queries (all queries if empty)
    pub filter_query_ids: Vec<String>,

    /// Stop accepting new queries after this many distinct ones
    pub limit_queries: Option<usize>,

    /// Reject hits covering less than this fraction of their model
    pub min_coverage: Option<f64>,

    /// Reject discontinuous-chopping hits covering less than this fraction of their model
    pub min_dc_coverage: Option<f64>,

    /// Categorise hits by match label (disable to treat every hit as normal)
    pub apply_category_rules: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            worst_permissible_evalue: Some(DEFAULT_WORST_PERMISSIBLE_EVALUE),
            worst_permissible_bitscore: Some(DEFAULT_WORST_PERMISSIBLE_BITSCORE),
            worst_permissible_score: None,
            filter_query_ids: Vec::new(),
            limit_queries: None,
            min_coverage: None,
            min_dc_coverage: None,
            apply_category_rules: true,
        }
    }
}

impl FilterSpec {
    /// A spec that accepts every hit and every query
    #[must_use]
    pub fn accept_all() -> Self {
        Self {
            worst_permissible_evalue: None,
            worst_permissible_bitscore: None,
            ..Self::default()
        }
    }

    /// Check a hit's score against the threshold for its own kind, then its
    /// resolver score against the general threshold
    ///
    /// # Errors
    ///
    /// Returns `Rejection::Score` naming the threshold that failed.
    pub fn check_score(&self, hit: &RawHit) -> Result<(), Rejection> {
        match hit.score_kind {
            ScoreKind::Evalue => {
                if let Some(worst) = self.worst_permissible_evalue {
                    if hit.score > worst {
                        return Err(score_rejection(ScoreKind::Evalue, hit.score, worst));
                    }
                }
            }
            ScoreKind::Bitscore => {
                if let Some(worst) = self.worst_permissible_bitscore {
                    if hit.score < worst {
                        return Err(score_rejection(ScoreKind::Bitscore, hit.score, worst));
                    }
                }
            }
            ScoreKind::CrhScore => {}
        }

        if let Some(worst) = self.worst_permissible_score {
            let score = hit.resolver_score().value();
            if score < worst {
                return Err(score_rejection(ScoreKind::CrhScore, score, worst));
            }
        }
        Ok(())
    }

    /// Minimum coverage that applies to hits of `category`
    #[must_use]
    pub fn min_coverage_for(&self, category: HitCategory) -> Option<f64> {
        match category {
            HitCategory::Normal => self.min_coverage,
            HitCategory::DiscontinuousChopping => match (self.min_coverage, self.min_dc_coverage) {
                (Some(general), Some(dc)) => Some(general.max(dc)),
                (general, dc) => dc.or(general),
            },
        }
    }

    /// Check a hit's model coverage. Hits that don't report a coverage pass.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::Coverage` if the coverage is below the minimum for the
    /// hit's category.
    pub fn check_coverage(&self, hit: &RawHit) -> Result<(), Rejection> {
        let category = hit.category(self.apply_category_rules);
        match (hit.coverage, self.min_coverage_for(category)) {
            (Some(coverage), Some(minimum)) if coverage < minimum => {
                Err(Rejection::Coverage { coverage, minimum })
            }
            _ => Ok(()),
        }
    }

    /// Apply every per-hit check
    ///
    /// # Errors
    ///
    /// Returns the first `Rejection` that applies.
    pub fn check_hit(&self, hit: &RawHit) -> Result<(), Rejection> {
        self.check_score(hit)?;
        self.check_coverage(hit)
    }

    /// Check a query id against the allow-list
    ///
    /// # Errors
    ///
    /// Returns `Rejection::QueryNotAllowed` if there is an allow-list and the
    /// query isn't on it.
    pub fn check_query(&self, query_id: &str) -> Result<(), Rejection> {
        if self.filter_query_ids.is_empty() || self.filter_query_ids.iter().any(|q| q == query_id)
        {
            Ok(())
        } else {
            Err(Rejection::QueryNotAllowed(query_id.to_string()))
        }
    }
}

fn score_rejection(kind: ScoreKind, value: f64, threshold: f64) -> Rejection {
    Rejection::Score {
        kind,
        value,
        threshold,
    }
}

/// Counts distinct queries admitted against an optional cap
#[derive(Debug, Clone, Default)]
pub struct QueryLimiter {
    limit: Option<usize>,
    admitted: usize,
    reported: bool,
}

impl QueryLimiter {
    #[must_use]
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            admitted: 0,
            reported: false,
        }
    }

    /// Admit a query not seen before
    ///
    /// # Errors
    ///
    /// Returns `Rejection::QueryLimitReached` once the cap has been reached.
    pub fn admit(&mut self, query_id: &str) -> Result<(), Rejection> {
        if self.is_saturated() {
            if !self.reported {
                info!(
                    "Reached the limit of {} queries; ignoring further queries",
                    self.admitted
                );
                self.reported = true;
            }
            return Err(Rejection::QueryLimitReached(query_id.to_string()));
        }
        self.admitted += 1;
        Ok(())
    }

    /// Whether no further queries will be admitted
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.limit.is_some_and(|limit| self.admitted >= limit)
    }

    #[must_use]
    pub fn admitted(&self) -> usize {
        self.admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DC_LABEL: &str = "dc_0123456789abcdef0123456789abcdef";

    fn raw(label: &str, score: f64, kind: ScoreKind) -> RawHit {
        RawHit::new(label, score, kind, "1-50".parse().unwrap())
    }

    #[test]
    fn test_default_thresholds() {
        let spec = FilterSpec::default();
        assert!(spec.check_score(&raw("m", 1e-5, ScoreKind::Evalue)).is_ok());
        assert!(spec.check_score(&raw("m", 0.001, ScoreKind::Evalue)).is_ok());
        assert!(matches!(
            spec.check_score(&raw("m", 0.01, ScoreKind::Evalue)),
            Err(Rejection::Score {
                kind: ScoreKind::Evalue,
                ..
            })
        ));
        assert!(spec.check_score(&raw("m", 10.0, ScoreKind::Bitscore)).is_ok());
        assert!(spec.check_score(&raw("m", 9.5, ScoreKind::Bitscore)).is_err());
        // No default threshold on resolver scores
        assert!(spec.check_score(&raw("m", -3.0, ScoreKind::CrhScore)).is_ok());
    }

    #[test]
    fn test_worst_permissible_score_applies_after_conversion() {
        let spec = FilterSpec {
            worst_permissible_score: Some(5.0),
            ..FilterSpec::accept_all()
        };
        // -log10(1e-6) = 6
        assert!(spec.check_score(&raw("m", 1e-6, ScoreKind::Evalue)).is_ok());
        // -log10(1e-4) = 4
        assert!(spec.check_score(&raw("m", 1e-4, ScoreKind::Evalue)).is_err());
        assert!(spec.check_score(&raw("m", 4.0, ScoreKind::CrhScore)).is_err());
    }

    #[test]
    fn test_coverage_uses_stricter_minimum_for_dc_hits() {
        let spec = FilterSpec {
            min_coverage: Some(0.5),
            min_dc_coverage: Some(0.8),
            ..FilterSpec::accept_all()
        };
        let normal = raw("1cukA01", 1.0, ScoreKind::CrhScore).with_coverage(0.6);
        let dc = raw(DC_LABEL, 1.0, ScoreKind::CrhScore).with_coverage(0.6);
        assert!(spec.check_coverage(&normal).is_ok());
        assert!(matches!(
            spec.check_coverage(&dc),
            Err(Rejection::Coverage { minimum, .. }) if (minimum - 0.8).abs() < 1e-12
        ));

        let no_rules = FilterSpec {
            apply_category_rules: false,
            ..spec.clone()
        };
        assert!(no_rules.check_coverage(&dc).is_ok());

        // Unknown coverage passes
        assert!(spec.check_coverage(&raw(DC_LABEL, 1.0, ScoreKind::CrhScore)).is_ok());
    }

    #[test]
    fn test_min_coverage_for() {
        let spec = FilterSpec {
            min_dc_coverage: Some(0.7),
            ..FilterSpec::default()
        };
        assert_eq!(spec.min_coverage_for(HitCategory::Normal), None);
        assert_eq!(
            spec.min_coverage_for(HitCategory::DiscontinuousChopping),
            Some(0.7)
        );
    }

    #[test]
    fn test_query_allow_list() {
        let spec = FilterSpec {
            filter_query_ids: vec!["q1".to_string(), "q3".to_string()],
            ..FilterSpec::default()
        };
        assert!(spec.check_query("q1").is_ok());
        assert_eq!(
            spec.check_query("q2"),
            Err(Rejection::QueryNotAllowed("q2".to_string()))
        );
        assert!(FilterSpec::default().check_query("anything").is_ok());
    }

    #[test]
    fn test_query_limiter() {
        let mut limiter = QueryLimiter::new(Some(2));
        assert!(limiter.admit("a").is_ok());
        assert!(!limiter.is_saturated());
        assert!(limiter.admit("b").is_ok());
        assert!(limiter.is_saturated());
        assert_eq!(
            limiter.admit("c"),
            Err(Rejection::QueryLimitReached("c".to_string()))
        );
        assert_eq!(limiter.admitted(), 2);

        let mut unlimited = QueryLimiter::default();
        for i in 0..100 {
            assert!(unlimited.admit(&i.to_string()).is_ok());
        }
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let spec: FilterSpec = serde_json::from_str(r#"{"min_coverage": 0.4}"#).unwrap();
        assert_eq!(spec.min_coverage, Some(0.4));
        assert_eq!(
            spec.worst_permissible_evalue,
            Some(DEFAULT_WORST_PERMISSIBLE_EVALUE)
        );
        assert!(spec.apply_category_rules);
    }
}
