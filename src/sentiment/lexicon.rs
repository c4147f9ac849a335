// src/sentiment/lexicon.rs
//! Fallback backend: lexicon polarity with a short negation window,
//! normalized to a compound score in [-1, 1]. Confidence is approximated as
//! the absolute compound (strong polarity is read as high confidence), a
//! deliberately crude proxy rather than a calibrated probability.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

use super::{SentimentBackend, SentimentScore};

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

#[derive(Debug, Clone, Default)]
pub struct LexiconBackend;

impl LexiconBackend {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Raw lexicon sum plus counters. Negation: a negator within the last
    /// 1..=3 tokens inverts the sign of the current word's score.
    fn raw_score(text: &str) -> (i32, usize, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;
        let mut hits = 0usize;

        for i in 0..tokens.len() {
            let base = Self::word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
            hits += 1;
        }

        (score, tokens.len(), hits)
    }
}

/// Map the unbounded raw sum onto [-1, 1] (the usual compound-score curve).
fn normalize_compound(raw: i32) -> f64 {
    let x = raw as f64;
    x / (x * x + 15.0).sqrt()
}

/// Alphanumeric tokens, lower-case.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

/// Single-token negators ("no longer" is covered by "no" alone, since
/// tokenization splits it).
fn is_negator(tok: &str) -> bool {
    matches!(tok, "not" | "no" | "never" | "cannot" | "without")
}

#[async_trait::async_trait]
impl SentimentBackend for LexiconBackend {
    async fn score(&self, text: &str) -> anyhow::Result<SentimentScore> {
        let (raw, tokens, hits) = Self::raw_score(text);
        let compound = normalize_compound(raw);

        let mut detail = BTreeMap::new();
        detail.insert("compound".to_string(), compound);
        detail.insert("raw".to_string(), raw as f64);
        detail.insert("tokens".to_string(), tokens as f64);
        detail.insert("hits".to_string(), hits as f64);

        Ok(SentimentScore {
            value: compound,
            confidence: compound.abs(),
            detail,
        })
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
