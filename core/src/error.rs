//! Error kinds surfaced by scoring, ranking, ingestion and aggregation.
//!
//! Each failure mode is its own variant so that a skipped query can be told
//! apart from a low score in the report.

use thiserror::Error;

use crate::QueryId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Cosine similarity requested with a zero-norm operand.
    #[error("cosine similarity is undefined for a zero-norm vector")]
    DegenerateVector,

    /// A query's candidate pool holds no document marked relevant.
    #[error("no relevant document among {candidates} candidates for query {query_id}")]
    NoRelevantDocument { query_id: QueryId, candidates: usize },

    /// MRR requested over zero ranks.
    #[error("cannot aggregate over an empty rank list")]
    EmptyInput,

    /// The same query id was ingested twice as a query record.
    #[error("query id {0} was ingested more than once")]
    DuplicateQueryId(QueryId),

    /// Ranks are 1-based.
    #[error("rank must be positive, got 0")]
    ZeroRank,

    /// A zero inside a rank list, with its position in the list.
    #[error("rank must be positive, got 0 at position {0}")]
    InvalidRank(usize),
}

pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_query() {
        let err = EvalError::NoRelevantDocument { query_id: 7, candidates: 3 };
        assert_eq!(err.to_string(), "no relevant document among 3 candidates for query 7");
        assert_eq!(EvalError::DuplicateQueryId(2).to_string(), "query id 2 was ingested more than once");
    }

    #[test]
    fn zero_rank_messages() {
        assert_eq!(EvalError::ZeroRank.to_string(), "rank must be positive, got 0");
        assert_eq!(EvalError::InvalidRank(3).to_string(), "rank must be positive, got 0 at position 3");
    }
}
