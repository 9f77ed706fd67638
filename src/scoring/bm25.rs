use std::collections::HashMap;
use tracing::debug;

use crate::constants::{BM25_B, BM25_EPSILON, BM25_K1};
use crate::text::Document;

use super::types::{Candidate, ScoredCandidate};

/// Okapi BM25 ranker with fixed parameters.
///
/// Defaults: `k1 = 1.5`, `b = 0.75`, `epsilon = 0.25`. Negative IDF values
/// (terms present in more than half of the corpus) are floored to
/// `epsilon * mean_idf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Ranker {
    k1: f64,
    b: f64,
    epsilon: f64,
}

impl Default for Bm25Ranker {
    fn default() -> Self {
        Self {
            k1: BM25_K1,
            b: BM25_B,
            epsilon: BM25_EPSILON,
        }
    }
}

impl Bm25Ranker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(k1: f64, b: f64, epsilon: f64) -> Self {
        Self { k1, b, epsilon }
    }

    /// Scores every candidate against `query`, in candidate order.
    pub fn score_all(&self, query: &Document, candidates: &[Candidate]) -> Vec<f64> {
        let corpus = Bm25Corpus::build(candidates, self.epsilon);
        (0..candidates.len())
            .map(|idx| corpus.score(query, idx, self.k1, self.b))
            .collect()
    }

    /// Scores, sorts descending (stable on ties) and keeps the top `k`.
    pub fn rank(
        &self,
        query: &Document,
        candidates: Vec<Candidate>,
        k: usize,
    ) -> Vec<ScoredCandidate> {
        if candidates.is_empty() {
            debug!("No candidates provided for ranking");
            return Vec::new();
        }

        let scores = self.score_all(query, &candidates);

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .zip(scores)
            .map(|(candidate, score)| ScoredCandidate::new(candidate, score))
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        debug!(
            query_len = query.len(),
            kept = scored.len(),
            top_score = scored.first().map(|c| c.score),
            "BM25 ranking complete"
        );

        scored
    }
}

/// Ranks `candidates` against `query` with the default BM25 parameters.
pub fn rank(query: &Document, candidates: Vec<Candidate>, k: usize) -> Vec<ScoredCandidate> {
    Bm25Ranker::default().rank(query, candidates, k)
}

/// Corpus statistics for one ranking call.
#[derive(Debug, Clone)]
pub struct Bm25Corpus {
    term_freqs: Vec<HashMap<String, usize>>,
    doc_lens: Vec<usize>,
    avgdl: f64,
    idf: HashMap<String, f64>,
}

impl Bm25Corpus {
    /// Builds term frequencies, document lengths and IDF over `candidates`.
    pub fn build(candidates: &[Candidate], epsilon: f64) -> Self {
        let n = candidates.len();
        let mut term_freqs = Vec::with_capacity(n);
        let mut doc_lens = Vec::with_capacity(n);
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for candidate in candidates {
            let tokens = candidate.document.tokens();
            let mut tf: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *tf.entry(token.clone()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += tokens.len();
            doc_lens.push(tokens.len());
            term_freqs.push(tf);
        }

        let avgdl = if n == 0 {
            0.0
        } else {
            total_len as f64 / n as f64
        };

        let mut idf = HashMap::with_capacity(doc_freq.len());
        let mut idf_sum = 0.0;
        let mut negative = Vec::new();
        for (term, df) in doc_freq {
            let value = ((n as f64 - df as f64 + 0.5) / (df as f64 + 0.5)).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term, value);
        }

        if !idf.is_empty() {
            let floor = epsilon * (idf_sum / idf.len() as f64);
            for term in negative {
                idf.insert(term, floor);
            }
        }

        Self {
            term_freqs,
            doc_lens,
            avgdl,
            idf,
        }
    }

    /// Number of documents in the corpus.
    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    pub fn avgdl(&self) -> f64 {
        self.avgdl
    }

    /// IDF of `term`, or `None` if it never occurs in the corpus.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// BM25 score of document `idx`; each query occurrence contributes once.
    pub fn score(&self, query: &Document, idx: usize, k1: f64, b: f64) -> f64 {
        let (Some(tf), Some(&doc_len)) = (self.term_freqs.get(idx), self.doc_lens.get(idx)) else {
            return 0.0;
        };

        let length_ratio = if self.avgdl > 0.0 {
            doc_len as f64 / self.avgdl
        } else {
            1.0
        };
        let norm = k1 * (1.0 - b + b * length_ratio);

        query
            .tokens()
            .iter()
            .map(|term| {
                let freq = tf.get(term).copied().unwrap_or(0) as f64;
                if freq == 0.0 {
                    return 0.0;
                }
                let idf = self.idf.get(term).copied().unwrap_or(0.0);
                idf * (freq * (k1 + 1.0)) / (freq + norm)
            })
            .sum()
    }
}
