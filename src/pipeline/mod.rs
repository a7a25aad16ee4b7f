//! Streaming, per-query resolution.
//!
//! Hits arrive tagged with a query id. Each is filtered on arrival and, if
//! accepted, accumulated under its query. Once a query is known to be complete it
//! is resolved, handed to the [`HitsProcessor`] and its hits are released:
//!
//! ```text
//! submit ──▶ ACCUMULATING ──(complete)──▶ resolve + process ──▶ EMITTED
//! ```
//!
//! A query completes when the client calls [`HitPipeline::notify_query_complete`],
//! when a new query id arrives in a [`InputOrder::Grouped`] stream, or at
//! [`HitPipeline::finish`]. Queries still open at `finish` are resolved in
//! parallel and then processed in the order they were first seen.
//!
//! ## Example
//!
//! ```rust
//! use resolve_hits::core::{RawHit, ScoreKind};
//! use resolve_hits::pipeline::{HitPipeline, HitsProcessor, PipelineConfig, SummaryFormat};
//!
//! let processor = HitsProcessor::summarize(std::io::sink(), SummaryFormat::Tsv);
//! let mut pipeline = HitPipeline::new(PipelineConfig::default(), processor);
//!
//! let hit = RawHit::new("1cukA01", 1e-20, ScoreKind::Evalue, "12-45".parse().unwrap());
//! pipeline.submit("query1", hit).unwrap();
//!
//! let processor = pipeline.finish().unwrap();
//! assert_eq!(processor.summaries()[0].resolved_hits, 1);
//! ```

pub mod processor;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::hit::{CandidateHit, RawHit};
use crate::resolve::architecture::ScoredArchitecture;
use crate::resolve::filter::{FilterSpec, QueryLimiter, Rejection};
use crate::resolve::resolver::resolve;
use crate::resolve::trim::TrimSpec;

pub use processor::{HitsProcessor, QuerySummary, SummaryFormat};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Query {0} has already been resolved and emitted")]
    QueryAlreadyEmitted(String),

    #[error("Failed to write results: {0}")]
    Io(#[from] std::io::Error),
}

/// How the input stream orders its hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputOrder {
    /// All of a query's hits are contiguous, so a new query id completes the previous query
    Grouped,
    /// Query ids may interleave; queries complete only on request or at the end
    #[default]
    Interleaved,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub input_order: InputOrder,
    pub filter: FilterSpec,
    /// Used when the processor reports trimmed boundaries
    pub trim: TrimSpec,
}

/// The result of submitting one hit
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected(Rejection),
}

/// Running totals over the life of a pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub hits_submitted: usize,
    pub hits_accepted: usize,
    pub queries_emitted: usize,
}

#[derive(Debug)]
enum QueryState {
    Accumulating(Vec<CandidateHit>),
    Emitted,
}

pub struct HitPipeline {
    config: PipelineConfig,
    processor: HitsProcessor,
    queries: IndexMap<String, QueryState>,
    limiter: QueryLimiter,
    open_query: Option<String>,
    stats: PipelineStats,
}

impl HitPipeline {
    #[must_use]
    pub fn new(config: PipelineConfig, processor: HitsProcessor) -> Self {
        let limiter = QueryLimiter::new(config.filter.limit_queries);
        Self {
            config,
            processor,
            queries: IndexMap::new(),
            limiter,
            open_query: None,
            stats: PipelineStats::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Whether the distinct-query cap has been reached, so no new query will be
    /// accepted (queries already open still accept hits)
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.limiter.is_saturated()
    }

    /// Number of queries accumulating hits
    #[must_use]
    pub fn num_open_queries(&self) -> usize {
        self.queries
            .values()
            .filter(|state| matches!(state, QueryState::Accumulating(_)))
            .count()
    }

    /// Submit one hit for `query_id`.
    ///
    /// A hit that fails the filter is dropped and reported as
    /// [`SubmitOutcome::Rejected`]; that isn't an error. The first hit of a new
    /// query opens it even if the hit itself is rejected, so the query is still
    /// emitted (with whatever hits were accepted).
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::QueryAlreadyEmitted` if the query has already been
    /// resolved, or `PipelineError::Io` if completing the previous query of a
    /// grouped stream fails to write.
    pub fn submit(&mut self, query_id: &str, hit: RawHit) -> Result<SubmitOutcome, PipelineError> {
        self.stats.hits_submitted += 1;

        if self.config.input_order == InputOrder::Grouped {
            if let Some(open) = self.open_query.take() {
                if open != query_id {
                    self.complete_if_open(&open)?;
                } else {
                    self.open_query = Some(open);
                }
            }
        }

        match self.queries.get(query_id) {
            Some(QueryState::Emitted) => {
                return Err(PipelineError::QueryAlreadyEmitted(query_id.to_string()))
            }
            Some(QueryState::Accumulating(_)) => {}
            None => {
                if let Err(rejection) = self.admit(query_id) {
                    return Ok(SubmitOutcome::Rejected(rejection));
                }
                self.queries
                    .insert(query_id.to_string(), QueryState::Accumulating(Vec::new()));
            }
        }
        if self.config.input_order == InputOrder::Grouped {
            self.open_query = Some(query_id.to_string());
        }

        if let Err(rejection) = self.config.filter.check_hit(&hit) {
            return Ok(SubmitOutcome::Rejected(rejection));
        }
        if let Some(QueryState::Accumulating(hits)) = self.queries.get_mut(query_id) {
            hits.push(hit.into_candidate());
            self.stats.hits_accepted += 1;
        }
        Ok(SubmitOutcome::Accepted)
    }

    /// Resolve and emit `query_id` now.
    ///
    /// Completing a query that never received a hit emits an empty architecture
    /// for it, unless the query is excluded by the filter's allow-list or the
    /// distinct-query cap, in which case nothing happens.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::QueryAlreadyEmitted` if the query has already been
    /// resolved, or `PipelineError::Io` if the processor fails to write.
    pub fn notify_query_complete(&mut self, query_id: &str) -> Result<(), PipelineError> {
        if self.open_query.as_deref() == Some(query_id) {
            self.open_query = None;
        }
        match self.queries.get_mut(query_id) {
            Some(QueryState::Emitted) => {
                Err(PipelineError::QueryAlreadyEmitted(query_id.to_string()))
            }
            Some(state) => {
                let hits = take_hits(state);
                self.emit(query_id, &hits, &resolve(&hits))
            }
            None => {
                if self.admit(query_id).is_err() {
                    return Ok(());
                }
                self.queries
                    .insert(query_id.to_string(), QueryState::Emitted);
                self.emit(query_id, &[], &ScoredArchitecture::default())
            }
        }
    }

    /// Resolve every query still open, finish the processor's work and return it.
    ///
    /// Open queries are resolved in parallel, then processed in the order they
    /// were first seen.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` if the processor fails to write.
    pub fn finish(mut self) -> Result<HitsProcessor, PipelineError> {
        self.open_query = None;
        let pending: Vec<(String, Vec<CandidateHit>)> = self
            .queries
            .iter_mut()
            .filter(|(_, state)| matches!(state, QueryState::Accumulating(_)))
            .map(|(query_id, state)| (query_id.clone(), take_hits(state)))
            .collect();

        let resolved: Vec<(String, Vec<CandidateHit>, ScoredArchitecture)> = pending
            .into_par_iter()
            .map(|(query_id, hits)| {
                let scored = resolve(&hits);
                (query_id, hits, scored)
            })
            .collect();

        for (query_id, hits, scored) in &resolved {
            self.emit(query_id, hits, scored)?;
        }
        self.processor.finish_work()?;

        info!(
            "Resolved {} queries from {} hits ({} passed the filter)",
            self.stats.queries_emitted, self.stats.hits_submitted, self.stats.hits_accepted
        );
        Ok(self.processor)
    }

    fn admit(&mut self, query_id: &str) -> Result<(), Rejection> {
        self.config.filter.check_query(query_id)?;
        self.limiter.admit(query_id)
    }

    fn complete_if_open(&mut self, query_id: &str) -> Result<(), PipelineError> {
        match self.queries.get_mut(query_id) {
            Some(state) if matches!(state, QueryState::Accumulating(_)) => {
                let hits = take_hits(state);
                self.emit(query_id, &hits, &resolve(&hits))
            }
            _ => Ok(()),
        }
    }

    fn emit(
        &mut self,
        query_id: &str,
        hits: &[CandidateHit],
        scored: &ScoredArchitecture,
    ) -> Result<(), PipelineError> {
        debug!(
            "Resolved query {query_id}: {} of {} hits kept, score {}",
            scored.architecture().len(),
            hits.len(),
            scored.score()
        );
        self.processor
            .process_query(query_id, hits, scored, &self.config.trim)?;
        self.stats.queries_emitted += 1;
        Ok(())
    }
}

/// Mark a query emitted and hand back the hits it had accumulated
fn take_hits(state: &mut QueryState) -> Vec<CandidateHit> {
    match std::mem::replace(state, QueryState::Emitted) {
        QueryState::Accumulating(hits) => hits,
        QueryState::Emitted => Vec::new(),
    }
}
