//! Reader for whitespace-separated hit tables.
//!
//! Each line holds one hit:
//!
//! | Column | Contents | Required |
//! |--------|----------|----------|
//! | 1 | Query id | Yes |
//! | 2 | Match id (model/domain label) | Yes |
//! | 3 | Score, in the units chosen with `--score-kind` | Yes |
//! | 4 | Boundaries as inclusive residue ranges, e.g. `12-45,60-80` | Yes |
//! | 5 | Fraction of the match's model covered by the hit | No |
//!
//! Files ending in `.gz` are decompressed on the fly and `-` reads stdin.

pub mod hits;

pub use hits::{open_input, parse_hits_text, HitReader, HitRecord, ParseError};
