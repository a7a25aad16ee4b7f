use serde::Serialize;
use thiserror::Error;

use crate::core::hit::CandidateHit;
use crate::core::types::Score;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchitectureError {
    #[error("Cannot build an architecture from overlapping hits: {first} and {second}")]
    OverlappingHits { first: String, second: String },
}

/// A collection of mutually non-overlapping hits, kept sorted by start boundary
///
/// Every constructor and mutator validates the non-overlap invariant, so an
/// `Architecture` that exists is always valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Architecture {
    hits: Vec<CandidateHit>,
}

impl Architecture {
    /// Build from hits in any order
    ///
    /// # Errors
    ///
    /// Returns `ArchitectureError::OverlappingHits` if any two hits share a residue.
    pub fn new(mut hits: Vec<CandidateHit>) -> Result<Self, ArchitectureError> {
        sort_by_start(&mut hits);
        check_no_overlaps(&hits)?;
        Ok(Self { hits })
    }

    /// Build from hits the resolver has already chosen to be compatible
    pub(crate) fn from_resolved(mut hits: Vec<CandidateHit>) -> Self {
        sort_by_start(&mut hits);
        debug_assert!(
            check_no_overlaps(&hits).is_ok(),
            "resolver produced overlapping hits"
        );
        Self { hits }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CandidateHit> {
        self.hits.get(index)
    }

    #[must_use]
    pub fn hits(&self) -> &[CandidateHit] {
        &self.hits
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateHit> {
        self.hits.iter()
    }

    /// Sum of the member hits' scores
    #[must_use]
    pub fn total_score(&self) -> Score {
        self.hits.iter().map(CandidateHit::score).sum()
    }

    /// Remove the first hit equal to `hit`, returning whether one was found
    pub fn remove(&mut self, hit: &CandidateHit) -> bool {
        match self.hits.iter().position(|h| h == hit) {
            Some(index) => {
                self.hits.remove(index);
                true
            }
            None => false,
        }
    }

    /// Add a hit, keeping the hits sorted
    ///
    /// # Errors
    ///
    /// Returns `ArchitectureError::OverlappingHits` if `hit` overlaps a member; the
    /// architecture is left unchanged.
    pub fn add_hit(&mut self, hit: CandidateHit) -> Result<(), ArchitectureError> {
        if let Some(existing) = self.hits.iter().find(|h| h.overlaps(&hit)) {
            return Err(overlap_error(existing, &hit));
        }
        let index = self
            .hits
            .partition_point(|h| (h.start(), h.stop()) <= (hit.start(), hit.stop()));
        self.hits.insert(index, hit);
        debug_assert!(check_no_overlaps(&self.hits).is_ok());
        Ok(())
    }

    /// Add every hit of `other`
    ///
    /// # Errors
    ///
    /// Returns `ArchitectureError::OverlappingHits` if the union would contain an
    /// overlap; the architecture is left unchanged.
    pub fn merge(&mut self, other: &Architecture) -> Result<(), ArchitectureError> {
        let mut hits = Vec::with_capacity(self.hits.len() + other.hits.len());
        hits.extend_from_slice(&self.hits);
        hits.extend_from_slice(&other.hits);
        sort_by_start(&mut hits);
        check_no_overlaps(&hits)?;
        self.hits = hits;
        Ok(())
    }
}

impl std::ops::Index<usize> for Architecture {
    type Output = CandidateHit;

    fn index(&self, index: usize) -> &CandidateHit {
        &self.hits[index]
    }
}

impl<'a> IntoIterator for &'a Architecture {
    type Item = &'a CandidateHit;
    type IntoIter = std::slice::Iter<'a, CandidateHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

impl IntoIterator for Architecture {
    type Item = CandidateHit;
    type IntoIter = std::vec::IntoIter<CandidateHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

fn sort_by_start(hits: &mut [CandidateHit]) {
    hits.sort_by(|a, b| (a.start(), a.stop()).cmp(&(b.start(), b.stop())));
}

/// Check every pair of hits whose spans meet, not just neighbours, so that
/// overlaps hidden behind an intervening discontiguous hit are still caught.
///
/// Assumes `hits` is sorted by start.
fn check_no_overlaps(hits: &[CandidateHit]) -> Result<(), ArchitectureError> {
    for (i, hit) in hits.iter().enumerate() {
        for later in hits[i + 1..]
            .iter()
            .take_while(|later| later.start() < hit.stop())
        {
            if hit.overlaps(later) {
                return Err(overlap_error(hit, later));
            }
        }
    }
    Ok(())
}

fn overlap_error(first: &CandidateHit, second: &CandidateHit) -> ArchitectureError {
    ArchitectureError::OverlappingHits {
        first: first.to_string(),
        second: second.to_string(),
    }
}

/// An architecture together with its total score, as produced by the resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoredArchitecture {
    architecture: Architecture,
    score: Score,
}

impl ScoredArchitecture {
    pub(crate) fn new(architecture: Architecture) -> Self {
        let score = architecture.total_score();
        Self {
            architecture,
            score,
        }
    }

    #[must_use]
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }
}
