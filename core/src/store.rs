//! Accumulates queries and candidate pools, then freezes them for ranking.
//!
//! [`DocumentStore`] is the single writer during ingestion. [`DocumentStore::freeze`]
//! consumes it and hands back a [`FrozenStore`], which is read-only and can be
//! shared across ranking workers without locking.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::config::{DuplicateQueryPolicy, EvalConfig, RELEVANT_MARKER};
use crate::error::{EvalError, Result};
use crate::{DocumentRecord, Query, QueryId, Role, ScoredDocument};

#[derive(Debug)]
pub struct DocumentStore {
    query_marker: i64,
    duplicate_query: DuplicateQueryPolicy,
    queries: BTreeMap<QueryId, Query>,
    pools: BTreeMap<QueryId, Vec<ScoredDocument>>,
    ingested: usize,
}

impl Default for DocumentStore {
    fn default() -> Self { Self::new(&EvalConfig::default()) }
}

impl DocumentStore {
    pub fn new(config: &EvalConfig) -> Self {
        Self {
            query_marker: config.query_marker,
            duplicate_query: config.duplicate_query,
            queries: BTreeMap::new(),
            pools: BTreeMap::new(),
            ingested: 0,
        }
    }

    /// Classify one record and file it under its query id.
    ///
    /// Fails only on a repeated query record under [`DuplicateQueryPolicy::Reject`],
    /// in which case the first record is kept.
    pub fn ingest(&mut self, record: DocumentRecord) -> Result<Role> {
        let DocumentRecord { query_id, relevance_marker, text, vector } = record;

        if relevance_marker == self.query_marker {
            let query = Query { id: query_id, text, vector };
            match self.queries.entry(query_id) {
                Entry::Vacant(slot) => { slot.insert(query); }
                Entry::Occupied(mut slot) => match self.duplicate_query {
                    DuplicateQueryPolicy::Reject => return Err(EvalError::DuplicateQueryId(query_id)),
                    DuplicateQueryPolicy::Overwrite => {
                        tracing::warn!(query_id, "duplicate query record, keeping the last one");
                        slot.insert(query);
                    }
                },
            }
            self.ingested += 1;
            return Ok(Role::Query);
        }

        let relevant = relevance_marker == RELEVANT_MARKER;
        self.pools.entry(query_id).or_default().push(ScoredDocument { text, vector, relevant });
        self.ingested += 1;
        Ok(Role::Candidate { relevant })
    }

    /// Records accepted so far.
    pub fn len(&self) -> usize { self.ingested }

    pub fn is_empty(&self) -> bool { self.ingested == 0 }

    /// Close ingestion.
    pub fn freeze(self) -> FrozenStore {
        let orphans: Vec<QueryId> = self
            .pools
            .keys()
            .filter(|id| !self.queries.contains_key(id))
            .copied()
            .collect();
        for query_id in &orphans {
            tracing::warn!(query_id, "candidates without a query record will not be ranked");
        }
        tracing::info!(
            queries = self.queries.len(),
            pools = self.pools.len(),
            records = self.ingested,
            "ingestion closed"
        );
        FrozenStore { queries: self.queries, pools: self.pools, orphans }
    }
}

#[derive(Debug)]
pub struct FrozenStore {
    queries: BTreeMap<QueryId, Query>,
    pools: BTreeMap<QueryId, Vec<ScoredDocument>>,
    orphans: Vec<QueryId>,
}

impl FrozenStore {
    /// Queries in ascending id order.
    pub fn queries(&self) -> impl Iterator<Item = &Query> + '_ {
        self.queries.values()
    }

    pub fn query(&self, id: QueryId) -> Option<&Query> {
        self.queries.get(&id)
    }

    /// Candidates for `id` in ingestion order; empty if none arrived.
    pub fn candidates(&self, id: QueryId) -> &[ScoredDocument] {
        self.pools.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_queries(&self) -> usize { self.queries.len() }

    /// Query ids that received candidates but no query record.
    pub fn orphan_pools(&self) -> &[QueryId] { &self.orphans }
}
