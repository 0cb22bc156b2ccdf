//! Run configuration.
//!
//! Uses Figment to merge built-in defaults, an optional TOML file and
//! `NEWSNLP_*` environment variables (`__` separates nested keys, e.g.
//! `NEWSNLP_SIBLINGS__THRESHOLD=0.5`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NlpError, Result};
use crate::tokenizer::Language;

pub const ENV_PREFIX: &str = "NEWSNLP_";

/// Threshold and result cap handed to `FeatureMatrix::similar_to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityPolicy {
    pub threshold: f32,
    pub top_n: usize,
}

impl SimilarityPolicy {
    pub fn new(threshold: f32, top_n: usize) -> Self {
        Self { threshold, top_n }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: String| NlpError::InvalidPolicy { name: name.to_string(), reason };
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(invalid(format!("threshold {} outside [0, 1]", self.threshold)));
        }
        if self.top_n == 0 {
            return Err(invalid("top_n must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditsConfig {
    /// Keyword lists whose Jaccard similarity falls below this count as
    /// changed. `0` compares keyword sets exactly.
    pub keyword_threshold: f32,
}

impl Default for EditsConfig {
    fn default() -> Self {
        Self { keyword_threshold: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NlpConfig {
    pub siblings: SimilarityPolicy,
    pub related: SimilarityPolicy,
    pub crap_similarity_threshold: f32,
    /// Posts whose keywords are this close to the list are crap.
    pub crap_banned_keywords: Vec<String>,
    /// Minimum combined text length (chars) before a metapost is synthesized.
    pub summary_minimum_length: usize,
    /// Keep documents matched by a tighter policy in looser policy results.
    pub overlap: bool,
    pub language: Language,
    /// Feed existing metaposts back into the corpus.
    pub nlp_uses_meta: bool,
    /// Vectorize regular posts from their excerpt instead of their text.
    pub summary_uses_nlp: bool,
    /// Vectorize metaposts from their caption instead of their title.
    pub meta_uses_nlp: bool,
    pub edits: EditsConfig,
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            siblings: SimilarityPolicy::new(0.4, 2),
            related: SimilarityPolicy::new(0.2, 2),
            crap_similarity_threshold: 0.5,
            crap_banned_keywords: Vec::new(),
            summary_minimum_length: 100,
            overlap: false,
            language: Language::French,
            nlp_uses_meta: false,
            summary_uses_nlp: false,
            meta_uses_nlp: true,
            edits: EditsConfig::default(),
        }
    }
}

impl NlpConfig {
    /// Defaults, then `path` when given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(NlpConfig::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(NlpError::Config(format!("config file {} not found", path.display())));
            }
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: NlpConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.siblings.validate("siblings")?;
        self.related.validate("related")?;
        if !(0.0..=1.0).contains(&self.crap_similarity_threshold) {
            return Err(NlpError::Config(format!(
                "crap_similarity_threshold {} outside [0, 1]",
                self.crap_similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.edits.keyword_threshold) {
            return Err(NlpError::Config(format!(
                "edits.keyword_threshold {} outside [0, 1]",
                self.edits.keyword_threshold
            )));
        }
        Ok(())
    }

    /// Named policies, tightest threshold first.
    pub fn policies(&self) -> [(&'static str, SimilarityPolicy); 2] {
        let mut policies = [("siblings", self.siblings), ("related", self.related)];
        policies.sort_by(|a, b| b.1.threshold.total_cmp(&a.1.threshold));
        policies
    }
}
