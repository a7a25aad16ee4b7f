//! Core data types for hit resolution.
//!
//! This module provides the interval arithmetic everything else is built on:
//!
//! - [`Boundary`]: A half-open point between two residue positions
//! - [`Segment`], [`SegmentRun`]: One contiguous interval and a possibly
//!   discontiguous run of intervals (one hit's footprint)
//! - [`CandidateHit`], [`RawHit`]: A scored, labelled footprint awaiting resolution,
//!   and the unfiltered record it is built from
//! - [`Score`], [`ScoreKind`], [`HitCategory`]: Score units and match categories
//!
//! ## Boundaries
//!
//! A boundary sits *between* residues, so a segment is the half-open range
//! `[start, stop)`:
//!
//! | Residues (inclusive) | Start boundary | Stop boundary | Length |
//! |----------------------|----------------|---------------|--------|
//! | 12-45                | before 12      | after 45 (=before 46) | 34 |
//! | 0-0                  | before 0       | after 0 (=before 1)   | 1  |
//!
//! Two hits may coexist in an architecture only if no pair of their segments
//! shares a residue; see [`segment::are_overlapping`].

pub mod boundary;
pub mod hit;
pub mod segment;
pub mod types;

pub use boundary::Boundary;
pub use hit::{CandidateHit, RawHit};
pub use segment::{Segment, SegmentError, SegmentRun};
pub use types::{HitCategory, Score, ScoreKind};
