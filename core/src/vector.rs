use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Term-frequency vector. Every stored count is at least 1; absent terms count zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, u32>", into = "HashMap<String, u32>")]
pub struct TermVector {
    counts: HashMap<String, u32>,
}

impl TermVector {
    pub fn new() -> Self { Self::default() }

    /// Build from precomputed counts, dropping zero entries.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut v = Self::new();
        for (term, count) in counts {
            if count > 0 {
                let slot = v.counts.entry(term.into()).or_insert(0);
                *slot = slot.saturating_add(count);
            }
        }
        v
    }

    pub fn get(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.counts.len() }

    pub fn is_empty(&self) -> bool { self.counts.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.counts.iter().map(|(t, &c)| (t.as_str(), c))
    }

    /// Sum of squared counts over every term, kept exact even at `u32::MAX` counts.
    pub fn norm_squared(&self) -> u128 {
        self.counts.values().map(|&c| u128::from(c) * u128::from(c)).sum()
    }

    pub fn norm(&self) -> f64 {
        (self.norm_squared() as f64).sqrt()
    }
}

impl From<HashMap<String, u32>> for TermVector {
    fn from(counts: HashMap<String, u32>) -> Self {
        Self::from_counts(counts)
    }
}

impl From<TermVector> for HashMap<String, u32> {
    fn from(v: TermVector) -> Self { v.counts }
}

/// Count each exact token string. Case-sensitive, no normalization.
pub fn vectorize<I, S>(tokens: I) -> TermVector
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, u32> = HashMap::new();
    for token in tokens {
        let token = token.as_ref();
        match counts.get_mut(token) {
            Some(c) => *c += 1,
            None => { counts.insert(token.to_string(), 1); }
        }
    }
    TermVector { counts }
}
