//! Evaluation settings and their compile-time defaults.
//!
//! The binary layers a JSON file and CLI flags on top of [`EvalConfig::default`].

use serde::{Deserialize, Serialize};

use crate::tokenizer::{NormalizingTokenizer, Tokenizer, WhitespaceTokenizer};

/// Relevance marker that identifies a query record rather than a candidate.
pub const QUERY_MARKER: i64 = 99;

/// Relevance marker of the gold candidate. Any other non-query value is non-relevant.
pub const RELEVANT_MARKER: i64 = 1;

/// Decimal places used for scores and MRR in reports.
pub const REPORT_PRECISION: usize = 4;

/// Cut-off used for the success@k line of the JSON summary.
pub const DEFAULT_SUCCESS_K: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// Split on whitespace only; case and punctuation are kept.
    #[default]
    Whitespace,
    /// NFKC, lowercase, stopword removal and English stemming.
    Normalizing,
}

impl TokenizerKind {
    pub fn build(self) -> Box<dyn Tokenizer> {
        match self {
            TokenizerKind::Whitespace => Box::new(WhitespaceTokenizer),
            TokenizerKind::Normalizing => Box::new(NormalizingTokenizer),
        }
    }
}

/// What to do with a query that cannot be ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRelevantPolicy {
    /// Record the query as skipped and keep evaluating the others.
    #[default]
    Skip,
    /// Stop the whole run at the first query that fails.
    Abort,
}

/// What to do when a query id arrives twice as a query record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateQueryPolicy {
    /// Keep the first record and return `DuplicateQueryId`.
    #[default]
    Reject,
    /// Keep the last record, logging a warning.
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub query_marker: i64,
    pub tokenizer: TokenizerKind,
    pub missing_relevant: MissingRelevantPolicy,
    pub duplicate_query: DuplicateQueryPolicy,
    /// Rank independent query ids on the rayon pool.
    pub parallel: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            query_marker: QUERY_MARKER,
            tokenizer: TokenizerKind::default(),
            missing_relevant: MissingRelevantPolicy::default(),
            duplicate_query: DuplicateQueryPolicy::default(),
            parallel: false,
        }
    }
}

impl EvalConfig {
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EvalConfig::from_json_str(r#"{"missing_relevant":"abort","parallel":true}"#).unwrap();
        assert_eq!(cfg.missing_relevant, MissingRelevantPolicy::Abort);
        assert!(cfg.parallel);
        assert_eq!(cfg.query_marker, QUERY_MARKER);
        assert_eq!(cfg.duplicate_query, DuplicateQueryPolicy::Reject);
        assert_eq!(cfg.tokenizer, TokenizerKind::Whitespace);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(EvalConfig::from_json_str(r#"{"duplicate_query":"merge"}"#).is_err());
    }
}
