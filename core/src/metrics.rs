//! Aggregate metrics over 1-based ranks.

use crate::error::{EvalError, Result};

pub fn reciprocal_rank(rank: usize) -> Result<f64> {
    if rank == 0 {
        return Err(EvalError::ZeroRank);
    }
    Ok(1.0 / rank as f64)
}

/// Mean Reciprocal Rank: the mean of `1/rank` over all entries.
pub fn mrr(ranks: &[usize]) -> Result<f64> {
    if ranks.is_empty() {
        return Err(EvalError::EmptyInput);
    }
    let mut sum = 0.0;
    for (pos, &rank) in ranks.iter().enumerate() {
        if rank == 0 {
            return Err(EvalError::InvalidRank(pos));
        }
        sum += 1.0 / rank as f64;
    }
    Ok(sum / ranks.len() as f64)
}

/// Fraction of ranks that fall within the top `k`.
pub fn success_at_k(ranks: &[usize], k: usize) -> Result<f64> {
    if ranks.is_empty() {
        return Err(EvalError::EmptyInput);
    }
    let hits = ranks.iter().filter(|&&r| r >= 1 && r <= k).count();
    Ok(hits as f64 / ranks.len() as f64)
}
