//! Cosine-similarity ranking of candidate pools and Mean Reciprocal Rank evaluation.

use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod rank;
pub mod report;
pub mod similarity;
pub mod store;
pub mod tokenizer;
pub mod vector;

pub use config::EvalConfig;
pub use error::{EvalError, Result};
pub use vector::{vectorize, TermVector};

pub type QueryId = i64;

/// One record at the ingestion boundary: a query or one of its candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub query_id: QueryId,
    /// Equal to the configured query marker for queries, else `1` for the relevant candidate.
    pub relevance_marker: i64,
    pub text: String,
    pub vector: TermVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub id: QueryId,
    pub text: String,
    pub vector: TermVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub text: String,
    pub vector: TermVector,
    pub relevant: bool,
}

/// How an ingested record was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Query,
    Candidate { relevant: bool },
}
