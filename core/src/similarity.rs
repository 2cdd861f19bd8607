use crate::error::{EvalError, Result};
use crate::vector::TermVector;

/// Cosine similarity of two term-frequency vectors.
///
/// The dot product runs over shared terms only; each norm runs over all of its
/// vector's terms. Both are accumulated as integers, so the result is exactly
/// symmetric and `cosine(a, a)` is exactly `1.0`.
pub fn cosine(a: &TermVector, b: &TermVector) -> Result<f64> {
    let norm_a = a.norm_squared();
    let norm_b = b.norm_squared();
    if norm_a == 0 || norm_b == 0 {
        return Err(EvalError::DegenerateVector);
    }
    let dot = dot(a, b);
    Ok(dot as f64 / ((norm_a as f64) * (norm_b as f64)).sqrt())
}

fn dot(a: &TermVector, b: &TermVector) -> u128 {
    // iterate the smaller side
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .map(|(term, c)| u128::from(c) * u128::from(large.get(term)))
        .sum()
}
