//! Resolution of one query's candidate hits into a non-overlapping architecture.
//!
//! - [`architecture`]: The validated, non-overlapping hit collection
//! - [`resolver`]: The maximum-score dynamic programme
//! - [`filter`]: Per-hit and per-query acceptance thresholds
//! - [`trim`]: Reporting-only trimming of boundaries that overlap discarded hits
//!
//! ## Example
//!
//! ```rust
//! use resolve_hits::core::{CandidateHit, Score};
//! use resolve_hits::resolve::resolve;
//!
//! let hits = vec![
//!     CandidateHit::new("0-9".parse().unwrap(), Score::new(5.0), "H1"),
//!     CandidateHit::new("5-14".parse().unwrap(), Score::new(8.0), "H2"),
//!     CandidateHit::new("10-19".parse().unwrap(), Score::new(6.0), "H3"),
//! ];
//!
//! let best = resolve(&hits);
//! assert_eq!(best.score(), Score::new(11.0));
//! assert_eq!(best.architecture().len(), 2);
//! ```

pub mod architecture;
pub mod filter;
pub mod resolver;
pub mod trim;

pub use architecture::{Architecture, ArchitectureError, ScoredArchitecture};
pub use filter::{FilterSpec, QueryLimiter, Rejection};
pub use resolver::resolve;
pub use trim::{trim_architecture, TrimOutcome, TrimSpec, TrimSpecError, TrimmedHit};
