//! # resolve-hits
//!
//! A library for resolving overlapping sequence hits into the best-scoring set of
//! non-overlapping hits.
//!
//! Searching a sequence against a library of models (domains, families, motifs)
//! usually yields many candidate hits, and the strongest of them tend to overlap.
//! `resolve-hits` picks, for each query sequence, the subset of hits that don't
//! share any residue and whose scores add up to the highest total.
//!
//! ## Features
//!
//! - **Exact resolution**: Weighted interval scheduling by dynamic programming
//! - **Discontiguous hits**: Hits may have several segments, and other hits may
//!   sit inside their gaps
//! - **Deterministic ties**: The same input gives the same answer whatever its order
//! - **Filtering**: E-value, bit-score and coverage thresholds, query allow-lists
//!   and a cap on the number of queries
//! - **Trimmed boundaries**: Report boundaries trimmed clear of small overlaps with
//!   the hits that weren't chosen
//! - **Streaming**: Hits are grouped by query as they arrive and each query is
//!   resolved as soon as it is complete
//!
//! ## Example
//!
//! ```rust
//! use resolve_hits::{resolve, CandidateHit, Score};
//!
//! let hits = vec![
//!     CandidateHit::new("1-100".parse().unwrap(), Score::new(30.0), "long"),
//!     CandidateHit::new("1-48".parse().unwrap(), Score::new(20.0), "left"),
//!     CandidateHit::new("52-100".parse().unwrap(), Score::new(18.0), "right"),
//! ];
//!
//! let best = resolve(&hits);
//! assert_eq!(best.score(), Score::new(38.0));
//! for hit in best.architecture() {
//!     println!("{} {}", hit.label(), hit.run());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Boundaries, segments, hits and scores
//! - [`resolve`]: Architectures, the resolver, and filter and trim policies
//! - [`pipeline`]: Streaming per-query resolution and result processors
//! - [`output`]: Text and JSON rendering of resolved hits
//! - [`parsing`]: Reader for whitespace-separated hit tables
//! - [`utils`]: JSON run configuration
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod output;
pub mod parsing;
pub mod pipeline;
pub mod resolve;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::hit::{CandidateHit, RawHit};
pub use crate::core::segment::{Segment, SegmentRun};
pub use crate::core::types::*;
pub use crate::pipeline::{HitPipeline, HitsProcessor, PipelineConfig};
pub use crate::resolve::architecture::{Architecture, ScoredArchitecture};
pub use crate::resolve::filter::FilterSpec;
pub use crate::resolve::resolver::resolve;
pub use crate::resolve::trim::TrimSpec;
