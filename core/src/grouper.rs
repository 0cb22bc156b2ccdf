//! Sibling/related classification of every post in a corpus.
//!
//! Sibling edges are not closed transitively: A~B and B~C says nothing about
//! A~C. Callers that want clusters run a union-find over the edge lists.

use serde::Serialize;
use std::collections::HashSet;

use crate::config::{NlpConfig, SimilarityPolicy};
use crate::corpus::Corpus;
use crate::crap::CrapDetector;
use crate::error::{NlpError, Result};
use crate::post::PostId;
use crate::vectorizer::{FeatureMatrix, Similar};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarPost {
    pub id: PostId,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub post_id: PostId,
    /// False when the post had no text to vectorize; its lists are then empty
    /// because nothing was computed, not because nothing matched.
    pub vectorized: bool,
    pub is_crap: bool,
    pub siblings: Vec<SimilarPost>,
    pub related: Vec<SimilarPost>,
}

impl Classification {
    pub fn sibling_ids(&self) -> impl Iterator<Item = &PostId> {
        self.siblings.iter().map(|s| &s.id)
    }

    pub fn related_ids(&self) -> impl Iterator<Item = &PostId> {
        self.related.iter().map(|s| &s.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Siblings,
    Related,
}

pub struct SimilarityGrouper<'a> {
    corpus: &'a Corpus,
    matrix: &'a FeatureMatrix,
    /// Tightest threshold first.
    policies: [(Relation, SimilarityPolicy); 2],
    overlap: bool,
    crap: Option<&'a CrapDetector>,
}

impl<'a> SimilarityGrouper<'a> {
    pub fn new(corpus: &'a Corpus, matrix: &'a FeatureMatrix, cfg: &NlpConfig) -> Result<Self> {
        cfg.siblings.validate("siblings")?;
        cfg.related.validate("related")?;
        if corpus.num_docs() != matrix.num_docs() {
            return Err(NlpError::Config(format!(
                "feature matrix has {} rows but corpus has {} documents",
                matrix.num_docs(),
                corpus.num_docs()
            )));
        }
        let policies = cfg.policies().map(|(name, policy)| {
            let relation = if name == "siblings" { Relation::Siblings } else { Relation::Related };
            (relation, policy)
        });
        Ok(Self { corpus, matrix, policies, overlap: cfg.overlap, crap: None })
    }

    pub fn with_crap_detector(mut self, detector: &'a CrapDetector) -> Self {
        self.crap = Some(detector);
        self
    }

    /// Classifies the post at corpus position `index`.
    pub fn classify(&self, index: usize) -> Result<Classification> {
        let entry = self
            .corpus
            .entry(index)
            .ok_or(NlpError::DocumentOutOfRange { index, len: self.corpus.len() })?;

        let mut classification = Classification {
            post_id: entry.post.id.clone(),
            vectorized: entry.doc.is_some(),
            is_crap: false,
            siblings: Vec::new(),
            related: Vec::new(),
        };
        let Some(doc) = entry.doc else {
            return Ok(classification);
        };

        if let Some(detector) = self.crap {
            classification.is_crap = detector.is_crap(&self.corpus.documents()[doc], &entry.post.keywords);
        }

        let mut seen: HashSet<usize> = HashSet::new();
        for (relation, policy) in &self.policies {
            let mut hits = self.matrix.similar_with(doc, policy)?;
            if !self.overlap {
                hits.retain(|s| !seen.contains(&s.doc));
            }
            seen.extend(hits.iter().map(|s| s.doc));
            let posts = self.to_posts(&hits);
            match relation {
                Relation::Siblings => classification.siblings = posts,
                Relation::Related => classification.related = posts,
            }
        }

        tracing::debug!(
            post = %classification.post_id,
            siblings = classification.siblings.len(),
            related = classification.related.len(),
            is_crap = classification.is_crap,
            "classified post"
        );
        Ok(classification)
    }

    pub fn classify_all(&self) -> Result<Vec<Classification>> {
        (0..self.corpus.len()).map(|i| self.classify(i)).collect()
    }

    fn to_posts(&self, hits: &[Similar]) -> Vec<SimilarPost> {
        hits.iter()
            .filter_map(|s| {
                self.corpus
                    .post_for_doc(s.doc)
                    .map(|p| SimilarPost { id: p.id.clone(), score: s.score })
            })
            .collect()
    }
}
