use std::collections::HashSet;

use crate::config::NlpConfig;
use crate::error::Result;
use crate::tokenizer::Language;
use crate::vectorizer::FeatureMatrix;

/// Flags low-quality posts by their closeness to a curated reference corpus
/// or to a list of banned keywords.
#[derive(Debug, Clone)]
pub struct CrapDetector {
    reference: Option<FeatureMatrix>,
    banned_keywords: Vec<String>,
    threshold: f32,
}

impl CrapDetector {
    /// An empty reference corpus disables the text check.
    pub fn new<S: AsRef<str>>(reference: &[S], lang: Language, threshold: f32) -> Result<Self> {
        let reference = if reference.is_empty() {
            None
        } else {
            Some(FeatureMatrix::build(reference, lang)?)
        };
        Ok(Self { reference, banned_keywords: Vec::new(), threshold })
    }

    /// Reference corpus plus the keyword ban list and threshold from `cfg`.
    pub fn from_config<S: AsRef<str>>(reference: &[S], cfg: &NlpConfig) -> Result<Self> {
        Ok(Self::new(reference, cfg.language, cfg.crap_similarity_threshold)?
            .with_banned_keywords(cfg.crap_banned_keywords.iter().cloned()))
    }

    pub fn disabled() -> Self {
        Self { reference: None, banned_keywords: Vec::new(), threshold: 1.0 }
    }

    pub fn with_banned_keywords<I: IntoIterator<Item = String>>(mut self, keywords: I) -> Self {
        self.banned_keywords = keywords.into_iter().collect();
        self
    }

    pub fn threshold(&self) -> f32 { self.threshold }

    pub fn is_enabled(&self) -> bool {
        self.reference.is_some() || !self.banned_keywords.is_empty()
    }

    /// Highest cosine similarity of `text` against any reference document.
    pub fn score(&self, text: &str) -> f32 {
        let Some(reference) = &self.reference else { return 0.0 };
        let vector = reference.project(text);
        reference.best_match(&vector).map_or(0.0, |m| m.score)
    }

    /// Jaccard similarity of `keywords` with the ban list. Zero when either is empty.
    pub fn keyword_score<S: AsRef<str>>(&self, keywords: &[S]) -> f32 {
        if keywords.is_empty() || self.banned_keywords.is_empty() {
            return 0.0;
        }
        let keywords: Vec<&str> = keywords.iter().map(AsRef::as_ref).collect();
        let banned: Vec<&str> = self.banned_keywords.iter().map(String::as_str).collect();
        keyword_similarity(&keywords, &banned)
    }

    /// Text scoring strictly above the threshold is crap. A keyword list
    /// reaching the threshold against the ban list is crap as well.
    pub fn is_crap<S: AsRef<str>>(&self, text: &str, keywords: &[S]) -> bool {
        if self.reference.is_some() && self.score(text) > self.threshold {
            return true;
        }
        !keywords.is_empty() && !self.banned_keywords.is_empty() && self.keyword_score(keywords) >= self.threshold
    }
}

/// Jaccard index of two keyword lists. Two empty lists score 0.
pub fn keyword_similarity<S: AsRef<str>>(a: &[S], b: &[S]) -> f32 {
    let a: HashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let b: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f32 / union as f32
}
