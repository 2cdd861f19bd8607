use serde::Serialize;

use crate::error::{EvalError, Result};
use crate::similarity::cosine;
use crate::{Query, QueryId, ScoredDocument};

/// Outcome of ranking one query's candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankResult {
    pub query_id: QueryId,
    /// 1-based position of the first relevant candidate.
    pub rank: usize,
    pub top_score: f64,
    pub top_text: String,
    pub top_relevant: bool,
    pub relevant_score: f64,
    pub relevant_text: String,
    /// Relevance flag carried by the located candidate.
    pub relevant_flag: bool,
    pub candidates: usize,
}

/// Score every candidate against the query and locate the relevant one.
///
/// Candidates are ordered by descending cosine similarity with a stable sort, so
/// equal scores keep ingestion order. A candidate with an empty vector scores
/// 0.0; an empty query vector fails the whole query.
pub fn rank(query: &Query, candidates: &[ScoredDocument]) -> Result<RankResult> {
    let no_relevant = || EvalError::NoRelevantDocument { query_id: query.id, candidates: candidates.len() };
    if candidates.is_empty() {
        return Err(no_relevant());
    }
    if query.vector.is_empty() {
        return Err(EvalError::DegenerateVector);
    }

    let mut scored: Vec<(usize, f64)> = Vec::with_capacity(candidates.len());
    for (idx, doc) in candidates.iter().enumerate() {
        let score = match cosine(&query.vector, &doc.vector) {
            Ok(s) => s,
            Err(EvalError::DegenerateVector) => {
                tracing::debug!(query_id = query.id, candidate = idx, "empty candidate vector scored as 0");
                0.0
            }
            Err(e) => return Err(e),
        };
        scored.push((idx, score));
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (pos, &(rel_idx, relevant_score)) = scored
        .iter()
        .enumerate()
        .find(|(_, (idx, _))| candidates[*idx].relevant)
        .ok_or_else(no_relevant)?;

    let (top_idx, top_score) = scored[0];
    let top = &candidates[top_idx];
    Ok(RankResult {
        query_id: query.id,
        rank: pos + 1,
        top_score,
        top_text: top.text.clone(),
        top_relevant: top.relevant,
        relevant_score,
        relevant_text: candidates[rel_idx].text.clone(),
        relevant_flag: candidates[rel_idx].relevant,
        candidates: candidates.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::TermVector;

    fn query(pairs: &[(&str, u32)]) -> Query {
        Query { id: 1, text: "q".into(), vector: TermVector::from_counts(pairs.iter().copied()) }
    }

    fn doc(text: &str, relevant: bool, pairs: &[(&str, u32)]) -> ScoredDocument {
        ScoredDocument { text: text.into(), vector: TermVector::from_counts(pairs.iter().copied()), relevant }
    }

    #[test]
    fn relevant_ranked_first() {
        let q = query(&[("a", 1), ("b", 1)]);
        let pool = vec![doc("partial", false, &[("a", 1)]), doc("exact", true, &[("a", 1), ("b", 1)])];
        let r = rank(&q, &pool).unwrap();
        assert_eq!(r.rank, 1);
        assert_eq!(r.top_text, "exact");
        assert!(r.top_relevant);
        assert_eq!(r.top_score, 1.0);
        assert_eq!(r.relevant_score, 1.0);
        assert_eq!(r.candidates, 2);
    }

    #[test]
    fn relevant_behind_better_match() {
        let q = query(&[("a", 1), ("b", 1)]);
        let pool = vec![doc("gold", true, &[("a", 1), ("c", 3)]), doc("close", false, &[("a", 1), ("b", 1)])];
        let r = rank(&q, &pool).unwrap();
        assert_eq!(r.rank, 2);
        assert_eq!(r.top_text, "close");
        assert!(!r.top_relevant);
        assert_eq!(r.relevant_text, "gold");
        assert!(r.relevant_flag);
        assert!(r.relevant_score < r.top_score);
    }

    #[test]
    fn ties_keep_ingestion_order() {
        let q = query(&[("a", 1)]);
        let pool = vec![
            doc("first", false, &[("a", 1)]),
            doc("second", false, &[("a", 2)]),
            doc("third", true, &[("a", 5)]),
        ];
        let r = rank(&q, &pool).unwrap();
        assert_eq!(r.top_text, "first");
        assert_eq!(r.rank, 3);
    }

    #[test]
    fn no_relevant_candidate() {
        let q = query(&[("a", 1)]);
        let pool = vec![doc("x", false, &[("a", 1)])];
        assert_eq!(rank(&q, &pool), Err(EvalError::NoRelevantDocument { query_id: 1, candidates: 1 }));
        assert_eq!(rank(&q, &[]), Err(EvalError::NoRelevantDocument { query_id: 1, candidates: 0 }));
    }

    #[test]
    fn empty_candidate_scores_zero() {
        let q = query(&[("a", 1)]);
        let pool = vec![doc("blank", false, &[]), doc("gold", true, &[("b", 1)])];
        let r = rank(&q, &pool).unwrap();
        assert_eq!(r.rank, 2);
        assert_eq!(r.top_score, 0.0);
    }

    #[test]
    fn empty_query_is_degenerate() {
        let q = query(&[]);
        let pool = vec![doc("gold", true, &[("a", 1)])];
        assert_eq!(rank(&q, &pool), Err(EvalError::DegenerateVector));
    }
}
