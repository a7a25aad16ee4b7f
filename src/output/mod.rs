//! Rendering of resolved architectures.
//!
//! | Format    | Layout                                                        |
//! |-----------|---------------------------------------------------------------|
//! | `compact` | `query  match  score  boundaries  [trimmed\|untrimmed]` per hit |
//! | `verbose` | A header line per query, then one descriptive line per hit    |
//! | `json`    | One JSON object per query, one query per line                 |
//!
//! Boundaries are written as inclusive residue ranges (`12-45,60-80`) in the
//! numbering the input used.

pub mod format;

pub use format::{to_output_string, BoundaryOutput, HitOutputFormat};
