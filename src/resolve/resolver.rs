//! Maximum-score resolution of overlapping hits.
//!
//! This is weighted interval scheduling by dynamic programming. Candidates are
//! processed in order of their stop boundary and `best[k]` holds the best
//! architecture that uses only the first `k` candidates. A candidate either extends
//! the best architecture that finishes at or before its start, or is skipped.
//!
//! A discontiguous candidate may also host other candidates entirely inside its
//! gaps. The best architecture within each gap depends only on the candidates lying
//! inside it, so it is solved once per (candidate, gap) and reused by every
//! enclosing pass.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::core::hit::CandidateHit;
use crate::core::types::Score;
use crate::resolve::architecture::{Architecture, ScoredArchitecture};

/// Find the highest-scoring set of mutually non-overlapping hits.
///
/// Ties between equal-scoring alternatives go to the one with fewer hits, then to
/// the one found first in processing order. Processing order depends only on the
/// hits themselves (not their order in `hits`), so the result is deterministic.
///
/// Hits with a NaN score are never chosen.
#[must_use]
pub fn resolve(hits: &[CandidateHit]) -> ScoredArchitecture {
    let order = processing_order(hits);
    if order.is_empty() {
        return ScoredArchitecture::default();
    }

    let mut solver = Solver {
        hits,
        order: &order,
        gaps: HashMap::new(),
    };
    let solution = solver.solve(&order);
    let chosen = solution.members.iter().map(|&i| hits[i].clone()).collect();
    ScoredArchitecture::new(Architecture::from_resolved(chosen))
}

/// Indices of `hits` sorted by stop, then start, then score (best first), then
/// fragments, then label, then original position
fn processing_order(hits: &[CandidateHit]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..hits.len())
        .filter(|&i| !hits[i].score().value().is_nan())
        .collect();
    order.sort_by(|&a, &b| compare_for_processing(&hits[a], &hits[b]).then(a.cmp(&b)));
    order
}

fn compare_for_processing(a: &CandidateHit, b: &CandidateHit) -> Ordering {
    a.stop()
        .cmp(&b.stop())
        .then_with(|| a.start().cmp(&b.start()))
        .then_with(|| b.score().cmp(&a.score()))
        .then_with(|| a.run().fragments().cmp(b.run().fragments()))
        .then_with(|| a.label().cmp(b.label()))
}

#[derive(Debug, Default)]
struct Solution {
    score: Score,
    members: Vec<usize>,
}

#[derive(Debug)]
enum Step {
    Skip,
    Take {
        hit: usize,
        prior: usize,
        nested: Vec<usize>,
    },
}

#[derive(Debug)]
struct Entry {
    score: Score,
    num_hits: usize,
    step: Step,
}

/// Whether (`score`, `num_hits`) should replace the running best
fn improves_on(score: Score, num_hits: usize, best: &Entry) -> bool {
    match score.cmp(&best.score) {
        Ordering::Greater => true,
        Ordering::Equal => num_hits < best.num_hits,
        Ordering::Less => false,
    }
}

struct Solver<'a> {
    hits: &'a [CandidateHit],
    /// Every candidate, in processing order
    order: &'a [usize],
    /// Best solution inside each (candidate, fragment) gap
    gaps: HashMap<(usize, usize), Solution>,
}

impl Solver<'_> {
    /// Solve over the candidates in `order` (indices into `hits`, already in
    /// processing order)
    fn solve(&mut self, order: &[usize]) -> Solution {
        let hits = self.hits;
        let stops: Vec<_> = order.iter().map(|&i| hits[i].stop()).collect();

        let mut best = Vec::with_capacity(order.len() + 1);
        best.push(Entry {
            score: Score::ZERO,
            num_hits: 0,
            step: Step::Skip,
        });

        for (pos, &index) in order.iter().enumerate() {
            let hit = &hits[index];

            // Candidates finishing at or before this one's start form a prefix of `order`
            let prior = stops[..pos].partition_point(|&stop| stop <= hit.start());

            let mut nested_score = Score::ZERO;
            let mut nested_members = Vec::new();
            for fragment in 0..hit.run().fragments().len() {
                let gap = self.solve_gap(index, fragment);
                nested_score = nested_score + gap.score;
                nested_members.extend_from_slice(&gap.members);
            }

            let take_score = best[prior].score + hit.score() + nested_score;
            let take_hits = best[prior].num_hits + 1 + nested_members.len();

            let entry = if improves_on(take_score, take_hits, &best[pos]) {
                Entry {
                    score: take_score,
                    num_hits: take_hits,
                    step: Step::Take {
                        hit: index,
                        prior,
                        nested: nested_members,
                    },
                }
            } else {
                Entry {
                    score: best[pos].score,
                    num_hits: best[pos].num_hits,
                    step: Step::Skip,
                }
            };
            best.push(entry);
        }

        let score = best[order.len()].score;
        let mut members = Vec::with_capacity(best[order.len()].num_hits);
        let mut k = order.len();
        while k > 0 {
            match &best[k].step {
                Step::Skip => k -= 1,
                Step::Take { hit, prior, nested } => {
                    members.push(*hit);
                    members.extend_from_slice(nested);
                    k = *prior;
                }
            }
        }

        Solution { score, members }
    }

    /// Best solution using only candidates lying entirely inside fragment
    /// `fragment` of candidate `hit`
    fn solve_gap(&mut self, hit: usize, fragment: usize) -> &Solution {
        let key = (hit, fragment);
        if !self.gaps.contains_key(&key) {
            let hits = self.hits;
            let gap = hits[hit].run().fragments()[fragment];
            let inside: Vec<usize> = self
                .order
                .iter()
                .copied()
                .filter(|&i| hits[i].start() >= gap.start() && hits[i].stop() <= gap.stop())
                .collect();
            let solution = if inside.is_empty() {
                Solution::default()
            } else {
                self.solve(&inside)
            };
            self.gaps.insert(key, solution);
        }
        &self.gaps[&key]
    }
}
