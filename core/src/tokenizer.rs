//! Text to token sequence. Only the output contract matters to the vectorizer:
//! deterministic, one string per occurrence, in text order.

use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Splits on runs of whitespace. Punctuation stays attached and case is preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have",
        "he", "her", "his", "i", "if", "in", "into", "is", "it", "its", "may", "no", "not",
        "of", "on", "or", "our", "she", "so", "such", "that", "the", "their", "then", "there",
        "these", "they", "this", "to", "was", "we", "were", "will", "with", "you", "your",
    ]
    .into_iter()
    .collect();
}

/// NFKC, lowercase, word extraction, stopword removal and English stemming.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizingTokenizer;

impl Tokenizer for NormalizingTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        WORD.find_iter(&normalized)
            .map(|m| m.as_str())
            .filter(|token| !STOPWORDS.contains(token))
            .map(|token| STEMMER.stem(token).into_owned())
            .collect()
    }
}
