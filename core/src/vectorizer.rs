//! TF-IDF feature matrix over one corpus.
//!
//! Rows are sparse, sorted by term id and L2-normalized, so the cosine of two
//! documents is a plain dot product. `similar_to(i)` and `similar_to(j)` are
//! each truncated to their own `top_n`: `j` may list `i` while `i` does not
//! list `j` because `i` had `top_n` closer neighbours. That asymmetry is
//! expected; the underlying `similarity(i, j)` is symmetric.

use serde::Serialize;
use std::collections::HashMap;

use crate::config::SimilarityPolicy;
use crate::error::{NlpError, Result};
use crate::tokenizer::{tokenize, Language};

pub type TermId = u32;

/// Sparse weighted vector, sorted by term id.
pub type SparseVec = Vec<(TermId, f32)>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Similar {
    pub doc: usize,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    dictionary: HashMap<String, TermId>,
    idf: Vec<f32>,
    rows: Vec<SparseVec>,
    lang: Language,
}

impl FeatureMatrix {
    /// Weights every (document, term) pair with `(1 + ln tf) * ln(1 + N / df)`.
    pub fn build<S: AsRef<str>>(documents: &[S], lang: Language) -> Result<Self> {
        if documents.is_empty() {
            return Err(NlpError::EmptyCorpus);
        }

        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut counts: Vec<HashMap<TermId, u32>> = Vec::with_capacity(documents.len());

        for doc in documents {
            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for (term, _pos) in tokenize(doc.as_ref(), lang) {
                let next_id = dictionary.len() as TermId;
                let tid = *dictionary.entry(term).or_insert(next_id);
                if tid == next_id {
                    df.push(0);
                }
                let count = tf_counts.entry(tid).or_insert(0);
                if *count == 0 {
                    df[tid as usize] += 1;
                }
                *count += 1;
            }
            counts.push(tf_counts);
        }

        let n = documents.len() as f32;
        let idf: Vec<f32> = df.iter().map(|&d| (1.0 + n / d.max(1) as f32).ln()).collect();

        let rows: Vec<SparseVec> = counts
            .into_iter()
            .map(|tf_counts| {
                let row = tf_counts
                    .into_iter()
                    .map(|(tid, raw)| (tid, tf_weight(raw) * idf[tid as usize]))
                    .collect();
                normalize(row)
            })
            .collect();

        tracing::info!(num_docs = rows.len(), num_terms = dictionary.len(), "built tf-idf matrix");
        Ok(Self { dictionary, idf, rows, lang })
    }

    pub fn num_docs(&self) -> usize { self.rows.len() }
    pub fn num_terms(&self) -> usize { self.dictionary.len() }
    pub fn language(&self) -> Language { self.lang }

    pub fn row(&self, index: usize) -> Result<&[(TermId, f32)]> {
        self.rows
            .get(index)
            .map(Vec::as_slice)
            .ok_or(NlpError::DocumentOutOfRange { index, len: self.rows.len() })
    }

    /// Whether document `index` contributed no terms.
    pub fn is_zero(&self, index: usize) -> Result<bool> {
        Ok(self.row(index)?.is_empty())
    }

    /// Cosine similarity of two documents. A document is always 1.0 to itself.
    pub fn similarity(&self, i: usize, j: usize) -> Result<f32> {
        let a = self.row(i)?;
        let b = self.row(j)?;
        if i == j {
            return Ok(1.0);
        }
        Ok(cosine(a, b))
    }

    /// Other documents scoring at least `threshold` against `index`, best
    /// first (ties by ascending index), at most `top_n` of them.
    pub fn similar_to(&self, index: usize, threshold: f32, top_n: usize) -> Result<Vec<Similar>> {
        let row = self.row(index)?;
        if top_n == 0 {
            return Ok(Vec::new());
        }
        let mut scored: Vec<Similar> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(doc, _)| *doc != index)
            .map(|(doc, other)| Similar { doc, score: cosine(row, other) })
            .filter(|s| s.score >= threshold)
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc.cmp(&b.doc)));
        scored.truncate(top_n);
        Ok(scored)
    }

    pub fn similar_with(&self, index: usize, policy: &SimilarityPolicy) -> Result<Vec<Similar>> {
        self.similar_to(index, policy.threshold, policy.top_n)
    }

    /// Weights `text` against this matrix's vocabulary; unknown terms are dropped.
    pub fn project(&self, text: &str) -> SparseVec {
        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        for (term, _pos) in tokenize(text, self.lang) {
            if let Some(&tid) = self.dictionary.get(&term) {
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
        }
        let row = tf_counts
            .into_iter()
            .map(|(tid, raw)| (tid, tf_weight(raw) * self.idf[tid as usize]))
            .collect();
        normalize(row)
    }

    /// Best matching document for an already projected vector.
    pub fn best_match(&self, vector: &[(TermId, f32)]) -> Option<Similar> {
        self.rows
            .iter()
            .enumerate()
            .map(|(doc, row)| Similar { doc, score: cosine(vector, row) })
            .max_by(|a, b| a.score.total_cmp(&b.score).then_with(|| b.doc.cmp(&a.doc)))
    }
}

#[inline]
fn tf_weight(raw: u32) -> f32 {
    if raw > 0 { 1.0 + (raw as f32).ln() } else { 0.0 }
}

fn normalize(mut row: SparseVec) -> SparseVec {
    row.sort_unstable_by_key(|(tid, _)| *tid);
    let norm = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in row.iter_mut() {
            *w /= norm;
        }
    }
    row
}

/// Dot product of two normalized sparse rows. Zero rows score 0.0.
fn cosine(a: &[(TermId, f32)], b: &[(TermId, f32)]) -> f32 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0f32;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot.clamp(0.0, 1.0)
}
