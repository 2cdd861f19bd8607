//! Run driver: Ingesting → Frozen → Ranking → Aggregated, with reporting left to
//! [`crate::report`].

use rayon::prelude::*;
use serde::Serialize;

use crate::config::{EvalConfig, MissingRelevantPolicy, DEFAULT_SUCCESS_K};
use crate::error::{EvalError, Result};
use crate::metrics::{mrr, success_at_k};
use crate::rank::{rank, RankResult};
use crate::store::{DocumentStore, FrozenStore};
use crate::tokenizer::Tokenizer;
use crate::vector::vectorize;
use crate::{DocumentRecord, Query, QueryId, Role};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Ranked(RankResult),
    Skipped {
        query_id: QueryId,
        #[serde(serialize_with = "error_string")]
        error: EvalError,
    },
}

fn error_string<S: serde::Serializer>(error: &EvalError, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(error)
}

impl QueryOutcome {
    pub fn query_id(&self) -> QueryId {
        match self {
            QueryOutcome::Ranked(r) => r.query_id,
            QueryOutcome::Skipped { query_id, .. } => *query_id,
        }
    }
}

/// Candidates filed under a query id that never got a query record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanPool {
    pub query_id: QueryId,
    pub candidates: usize,
}

impl OrphanPool {
    pub fn collect(frozen: &FrozenStore) -> Vec<OrphanPool> {
        frozen
            .orphan_pools()
            .iter()
            .map(|&query_id| OrphanPool { query_id, candidates: frozen.candidates(query_id).len() })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub outcomes: Vec<QueryOutcome>,
    pub orphans: Vec<OrphanPool>,
    pub mrr: f64,
    pub success_at_1: f64,
    pub ranked: usize,
    pub skipped: usize,
}

impl Evaluation {
    pub fn ranks(&self) -> impl Iterator<Item = &RankResult> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            QueryOutcome::Ranked(r) => Some(r),
            QueryOutcome::Skipped { .. } => None,
        })
    }
}

/// Ingesting-state driver: tokenizes, vectorizes and files each submitted document.
pub struct Pipeline {
    config: EvalConfig,
    tokenizer: Box<dyn Tokenizer>,
    store: DocumentStore,
}

impl Pipeline {
    pub fn new(config: EvalConfig) -> Self {
        let tokenizer = config.tokenizer.build();
        Self::with_tokenizer(config, tokenizer)
    }

    pub fn with_tokenizer(config: EvalConfig, tokenizer: Box<dyn Tokenizer>) -> Self {
        let store = DocumentStore::new(&config);
        Self { config, tokenizer, store }
    }

    pub fn config(&self) -> &EvalConfig { &self.config }

    pub fn submit(&mut self, query_id: QueryId, relevance_marker: i64, text: impl Into<String>) -> Result<Role> {
        let text = text.into();
        let vector = vectorize(self.tokenizer.tokenize(&text));
        self.store.ingest(DocumentRecord { query_id, relevance_marker, text, vector })
    }

    /// Ingest a record whose vector was computed upstream.
    pub fn submit_record(&mut self, record: DocumentRecord) -> Result<Role> {
        self.store.ingest(record)
    }

    pub fn freeze(self) -> FrozenStore {
        self.store.freeze()
    }

    /// Freeze, rank and aggregate in one go.
    pub fn finish(self) -> Result<Evaluation> {
        let config = self.config.clone();
        let frozen = self.freeze();
        let outcomes = rank_all(&frozen, &config)?;
        aggregate(outcomes, OrphanPool::collect(&frozen))
    }
}

fn rank_one(frozen: &FrozenStore, query: &Query) -> QueryOutcome {
    match rank(query, frozen.candidates(query.id)) {
        Ok(r) => {
            tracing::debug!(query_id = r.query_id, rank = r.rank, score = r.relevant_score, "ranked");
            QueryOutcome::Ranked(r)
        }
        Err(error) => {
            tracing::warn!(query_id = query.id, %error, "query not ranked");
            QueryOutcome::Skipped { query_id: query.id, error }
        }
    }
}

/// Rank every query in ascending id order.
///
/// Under [`MissingRelevantPolicy::Abort`] the first failing query ends the run.
pub fn rank_all(frozen: &FrozenStore, config: &EvalConfig) -> Result<Vec<QueryOutcome>> {
    let queries: Vec<&Query> = frozen.queries().collect();
    tracing::info!(queries = queries.len(), parallel = config.parallel, "ranking");

    let outcomes: Vec<QueryOutcome> = if config.parallel {
        queries.par_iter().map(|q| rank_one(frozen, q)).collect()
    } else {
        queries.iter().map(|q| rank_one(frozen, q)).collect()
    };

    if config.missing_relevant == MissingRelevantPolicy::Abort {
        if let Some(QueryOutcome::Skipped { error, .. }) =
            outcomes.iter().find(|o| matches!(o, QueryOutcome::Skipped { .. }))
        {
            return Err(error.clone());
        }
    }
    Ok(outcomes)
}

/// MRR over the ranked queries. Fails with `EmptyInput` when none were ranked.
/// Orphan pools are carried through for reporting only.
pub fn aggregate(outcomes: Vec<QueryOutcome>, orphans: Vec<OrphanPool>) -> Result<Evaluation> {
    let ranks: Vec<usize> = outcomes
        .iter()
        .filter_map(|o| match o {
            QueryOutcome::Ranked(r) => Some(r.rank),
            QueryOutcome::Skipped { .. } => None,
        })
        .collect();
    let mrr = mrr(&ranks)?;
    let success_at_1 = success_at_k(&ranks, DEFAULT_SUCCESS_K)?;
    let skipped = outcomes.len() - ranks.len();
    tracing::info!(ranked = ranks.len(), skipped, orphans = orphans.len(), mrr, "aggregated");
    Ok(Evaluation { outcomes, orphans, mrr, success_at_1, ranked: ranks.len(), skipped })
}
