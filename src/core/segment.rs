use serde::Serialize;
use thiserror::Error;

use crate::core::boundary::Boundary;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("Segment stop {stop} must be after its start {start}")]
    StopNotAfterStart { start: u32, stop: u32 },

    #[error("Cannot create a segment run from an empty list of segments")]
    NoSegments,

    #[error("Cannot create a segment run with fragments that don't start after the start")]
    FragmentsNotAfterStart,

    #[error("Cannot create a segment run with fragments that don't end before the stop")]
    FragmentsNotBeforeStop,

    #[error("Cannot create a segment run with fragments that aren't strictly increasing")]
    FragmentsNotIncreasing,

    #[error("Invalid residue range: {0}")]
    InvalidRange(String),
}

/// One contiguous run of residues between a start and a stop boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Segment {
    start: Boundary,
    stop: Boundary,
}

impl Segment {
    /// # Errors
    ///
    /// Returns `SegmentError::StopNotAfterStart` unless `start < stop`.
    pub fn new(start: Boundary, stop: Boundary) -> Result<Self, SegmentError> {
        if stop <= start {
            return Err(SegmentError::StopNotAfterStart {
                start: start.res_after(),
                stop: stop.res_after(),
            });
        }
        Ok(Self { start, stop })
    }

    /// Build from inclusive residue indices (e.g. `12-45` covers residues 12 to 45)
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::StopNotAfterStart` if `last < first`, or
    /// `SegmentError::InvalidRange` if `last` has no boundary after it.
    pub fn from_residues(first: u32, last: u32) -> Result<Self, SegmentError> {
        let stop = Boundary::checked_after(last)
            .ok_or_else(|| SegmentError::InvalidRange(format!("{first}-{last}")))?;
        Self::new(Boundary::before(first), stop)
    }

    #[must_use]
    pub fn start(&self) -> Boundary {
        self.start
    }

    #[must_use]
    pub fn stop(&self) -> Boundary {
        self.stop
    }

    #[must_use]
    pub fn length(&self) -> u32 {
        // Construction guarantees start < stop
        self.stop.res_after() - self.start.res_after()
    }

    #[must_use]
    pub fn overlaps(&self, other: &Segment) -> bool {
        self.start < other.stop && other.start < self.stop
    }

    /// Number of residues shared with `other` (0 if disjoint)
    #[must_use]
    pub fn overlap_by(&self, other: &Segment) -> u32 {
        let start = self.start.max(other.start);
        let stop = self.stop.min(other.stop);
        start.residues_until(stop).unwrap_or(0)
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.res_after(), self.stop.res_before())
    }
}

/// The full, possibly discontiguous, footprint of one hit.
///
/// The first start and last stop are stored directly; any interior gaps are stored
/// as fragments (each fragment runs from the stop of one segment to the start of the
/// next). A run with no fragments is a single segment. Segments are derived by index
/// on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SegmentRun {
    start: Boundary,
    stop: Boundary,
    fragments: Vec<Segment>,
}

impl SegmentRun {
    /// Contiguous run from `start` to `stop`
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::StopNotAfterStart` unless `start < stop`.
    pub fn contiguous(start: Boundary, stop: Boundary) -> Result<Self, SegmentError> {
        Self::with_fragments(start, stop, Vec::new())
    }

    /// Run from its first start, last stop and the gaps between its segments
    ///
    /// # Errors
    ///
    /// Returns a `SegmentError` if the fragments are not strictly inside
    /// `start..stop`, or are not strictly increasing and non-adjacent.
    pub fn with_fragments(
        start: Boundary,
        stop: Boundary,
        fragments: Vec<Segment>,
    ) -> Result<Self, SegmentError> {
        if stop <= start {
            return Err(SegmentError::StopNotAfterStart {
                start: start.res_after(),
                stop: stop.res_after(),
            });
        }
        if let (Some(first), Some(last)) = (fragments.first(), fragments.last()) {
            if start >= first.start() {
                return Err(SegmentError::FragmentsNotAfterStart);
            }
            if stop <= last.stop() {
                return Err(SegmentError::FragmentsNotBeforeStop);
            }
            if fragments.windows(2).any(|w| w[0].stop() >= w[1].start()) {
                return Err(SegmentError::FragmentsNotIncreasing);
            }
        }
        Ok(Self {
            start,
            stop,
            fragments,
        })
    }

    /// Run from an explicit list of segments
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::NoSegments` for an empty list and
    /// `SegmentError::FragmentsNotIncreasing` if consecutive segments overlap or touch.
    pub fn from_segments(segments: &[Segment]) -> Result<Self, SegmentError> {
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Err(SegmentError::NoSegments);
        };
        let fragments = segments
            .windows(2)
            .map(|w| {
                Segment::new(w[0].stop(), w[1].start())
                    .map_err(|_| SegmentError::FragmentsNotIncreasing)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_fragments(first.start(), last.stop(), fragments)
    }

    /// Run from inclusive residue-index pairs, e.g. `[(12, 45), (60, 80)]`
    ///
    /// # Errors
    ///
    /// Returns a `SegmentError` if any pair is reversed or the pairs are not
    /// strictly increasing.
    pub fn from_residue_ranges(ranges: &[(u32, u32)]) -> Result<Self, SegmentError> {
        let segments = ranges
            .iter()
            .map(|&(first, last)| Segment::from_residues(first, last))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_segments(&segments)
    }

    #[must_use]
    pub fn start(&self) -> Boundary {
        self.start
    }

    #[must_use]
    pub fn stop(&self) -> Boundary {
        self.stop
    }

    #[must_use]
    pub fn is_discontiguous(&self) -> bool {
        !self.fragments.is_empty()
    }

    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.fragments.len() + 1
    }

    /// The gaps between consecutive segments
    #[must_use]
    pub fn fragments(&self) -> &[Segment] {
        &self.fragments
    }

    /// Start boundary of the segment at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_segments()`.
    #[must_use]
    pub fn start_of_segment(&self, index: usize) -> Boundary {
        if index > 0 {
            self.fragments[index - 1].stop()
        } else {
            self.start
        }
    }

    /// Stop boundary of the segment at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_segments()`.
    #[must_use]
    pub fn stop_of_segment(&self, index: usize) -> Boundary {
        if index < self.fragments.len() {
            self.fragments[index].start()
        } else {
            self.stop
        }
    }

    /// The segment at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_segments()`.
    #[must_use]
    pub fn segment(&self, index: usize) -> Segment {
        Segment {
            start: self.start_of_segment(index),
            stop: self.stop_of_segment(index),
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.num_segments()).map(|i| self.segment(i))
    }

    /// Stop of the first segment, or `None` for a contiguous run
    #[must_use]
    pub fn stop_of_first_segment(&self) -> Option<Boundary> {
        self.fragments.first().map(Segment::start)
    }

    /// Start of the last segment, or `None` for a contiguous run
    #[must_use]
    pub fn start_of_last_segment(&self) -> Option<Boundary> {
        self.fragments.last().map(Segment::stop)
    }

    /// Sum of the lengths of all segments
    #[must_use]
    pub fn total_length(&self) -> u32 {
        self.segments().map(|s| s.length()).sum()
    }

    /// Index of the first segment that doesn't finish at or before `boundary`
    fn first_segment_not_before(&self, boundary: Boundary) -> usize {
        let (mut lo, mut hi) = (0, self.num_segments());
        while lo < hi {
            let mid = (lo + hi) / 2;
            if self.stop_of_segment(mid) <= boundary {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Call `f` on every pair of genuinely overlapping segments, walking both
    /// runs' segments in lock-step
    fn for_each_overlap(&self, other: &SegmentRun, mut f: impl FnMut(&Segment, &Segment)) {
        let (num_a, num_b) = (self.num_segments(), other.num_segments());
        let mut a = self.first_segment_not_before(other.start);
        let mut b = other.first_segment_not_before(self.start);

        while a < num_a && b < num_b {
            let seg_a = self.segment(a);
            let seg_b = other.segment(b);
            if seg_a.overlaps(&seg_b) {
                f(&seg_a, &seg_b);
            }
            if seg_a.stop() <= seg_b.stop() {
                a += 1;
            }
            if seg_b.stop() <= seg_a.stop() {
                b += 1;
            }
        }
    }
}

impl std::fmt::Display for SegmentRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for SegmentRun {
    type Err = SegmentError;

    /// Parse inclusive residue ranges such as `12-45` or `12-45,60-80`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ranges = s
            .split(',')
            .map(|range| {
                let (first, last) = range
                    .trim()
                    .split_once('-')
                    .ok_or_else(|| SegmentError::InvalidRange(range.to_string()))?;
                let first = first
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| SegmentError::InvalidRange(range.to_string()))?;
                let last = last
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| SegmentError::InvalidRange(range.to_string()))?;
                Ok((first, last))
            })
            .collect::<Result<Vec<_>, SegmentError>>()?;
        Self::from_residue_ranges(&ranges)
    }
}

/// Whether either run overlaps, interleaves or straddles the other.
///
/// Only compares the overall spans, so this is a cheap pre-filter for
/// [`are_overlapping`].
#[must_use]
pub fn any_interaction(a: &SegmentRun, b: &SegmentRun) -> bool {
    a.start < b.stop && b.start < a.stop
}

/// Whether the two runs share at least one residue.
///
/// Requires a genuine overlap of segments, not just interleaving.
#[must_use]
pub fn are_overlapping(a: &SegmentRun, b: &SegmentRun) -> bool {
    if !any_interaction(a, b) {
        return false;
    }
    let mut found = false;
    a.for_each_overlap(b, |_, _| found = true);
    found
}

/// Number of residues shared by the two runs
#[must_use]
pub fn overlap_by(a: &SegmentRun, b: &SegmentRun) -> u32 {
    if !any_interaction(a, b) {
        return 0;
    }
    let mut total = 0;
    a.for_each_overlap(b, |x, y| total += x.overlap_by(y));
    total
}

#[must_use]
pub fn shorter_length(a: &SegmentRun, b: &SegmentRun) -> u32 {
    a.total_length().min(b.total_length())
}

#[must_use]
pub fn longer_length(a: &SegmentRun, b: &SegmentRun) -> u32 {
    a.total_length().max(b.total_length())
}

#[must_use]
pub fn fraction_overlap_over_shorter(a: &SegmentRun, b: &SegmentRun) -> f64 {
    f64::from(overlap_by(a, b)) / f64::from(shorter_length(a, b))
}

#[must_use]
pub fn fraction_overlap_over_longer(a: &SegmentRun, b: &SegmentRun) -> f64 {
    f64::from(overlap_by(a, b)) / f64::from(longer_length(a, b))
}
