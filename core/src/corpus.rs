use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use time::Date;

use crate::config::NlpConfig;
use crate::post::{Post, PostId};
use crate::tokenizer::word_count;

/// Which days of posts take part in a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DaySelection {
    #[default]
    All,
    Days(Vec<Date>),
    /// Inclusive on both ends.
    Range { from: Date, to: Date },
}

impl DaySelection {
    pub fn contains(&self, date: Date) -> bool {
        match self {
            DaySelection::All => true,
            DaySelection::Days(days) => days.contains(&date),
            DaySelection::Range { from, to } => *from <= date && date <= *to,
        }
    }
}

/// How the text of a post is assembled before vectorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextExtractor {
    TitleAndText,
    TitleAndExcerpt,
    CaptionAndSummary,
    TitleAndSummary,
}

impl TextExtractor {
    /// `None` when neither part carries any text.
    pub fn extract(self, post: &Post) -> Option<String> {
        let (head, body) = match self {
            TextExtractor::TitleAndText => (Some(post.title.as_str()), post.text.as_deref()),
            TextExtractor::TitleAndExcerpt => (Some(post.title.as_str()), post.excerpt.as_deref()),
            TextExtractor::CaptionAndSummary => (post.caption.as_deref(), post.summary.as_deref()),
            TextExtractor::TitleAndSummary => (Some(post.title.as_str()), post.summary.as_deref()),
        };
        let head = add_fullstop(head.unwrap_or("").trim());
        let body = body.unwrap_or("").trim();
        let joined = match (head.is_empty(), body.is_empty()) {
            (true, true) => return None,
            (false, true) => head,
            (true, false) => body.to_string(),
            (false, false) => format!("{head} {body}"),
        };
        Some(joined)
    }
}

/// Terminates a sentence with a full stop unless it already ends with punctuation.
pub fn add_fullstop(sentence: &str) -> String {
    if sentence.is_empty() || sentence.ends_with(['.', '!', '?', '…']) {
        sentence.to_string()
    } else {
        format!("{sentence}.")
    }
}

/// Extractor table keyed by post kind.
#[derive(Debug, Clone)]
pub struct ExtractionStrategy {
    by_kind: BTreeMap<String, TextExtractor>,
    fallback: TextExtractor,
    meta: TextExtractor,
}

impl ExtractionStrategy {
    pub fn new(fallback: TextExtractor, meta: TextExtractor) -> Self {
        Self { by_kind: BTreeMap::new(), fallback, meta }
    }

    pub fn from_config(cfg: &NlpConfig) -> Self {
        let fallback = if cfg.summary_uses_nlp { TextExtractor::TitleAndExcerpt } else { TextExtractor::TitleAndText };
        let meta = if cfg.meta_uses_nlp { TextExtractor::CaptionAndSummary } else { TextExtractor::TitleAndSummary };
        Self::new(fallback, meta)
    }

    pub fn with_kind(mut self, kind: impl Into<String>, extractor: TextExtractor) -> Self {
        self.by_kind.insert(kind.into(), extractor);
        self
    }

    pub fn resolve(&self, post: &Post) -> TextExtractor {
        if post.is_meta() {
            return self.meta;
        }
        self.by_kind.get(&post.kind).copied().unwrap_or(self.fallback)
    }

    /// Text of a post feeding a metapost: its summary when one was already
    /// generated, its regular text otherwise.
    pub fn metapost_input(&self, post: &Post) -> Option<String> {
        if post.summary.is_some() {
            self.meta.extract(post).or_else(|| self.resolve(post).extract(post))
        } else {
            self.resolve(post).extract(post)
        }
    }
}

impl Default for ExtractionStrategy {
    fn default() -> Self {
        Self::from_config(&NlpConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct CorpusEntry {
    pub post: Post,
    /// Row in the feature matrix; `None` marks an unvectorizable post.
    pub doc: Option<usize>,
}

/// Posts of one run along with their extracted documents.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
    documents: Vec<String>,
    doc_to_entry: Vec<usize>,
    words: usize,
}

impl Corpus {
    pub fn entries(&self) -> &[CorpusEntry] { &self.entries }
    pub fn documents(&self) -> &[String] { &self.documents }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn num_docs(&self) -> usize { self.documents.len() }
    pub fn word_count(&self) -> usize { self.words }

    pub fn entry(&self, index: usize) -> Option<&CorpusEntry> {
        self.entries.get(index)
    }

    pub fn post_for_doc(&self, doc: usize) -> Option<&Post> {
        self.doc_to_entry.get(doc).map(|&i| &self.entries[i].post)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.post.id == id)
    }

    pub fn post(&self, id: &str) -> Option<&Post> {
        self.position(id).map(|i| &self.entries[i].post)
    }

    pub fn ids(&self) -> impl Iterator<Item = &PostId> {
        self.entries.iter().map(|e| &e.post.id)
    }
}

pub struct CorpusBuilder {
    selection: DaySelection,
    strategy: ExtractionStrategy,
    include_meta: bool,
}

impl CorpusBuilder {
    pub fn new(strategy: ExtractionStrategy) -> Self {
        Self { selection: DaySelection::All, strategy, include_meta: false }
    }

    pub fn from_config(cfg: &NlpConfig) -> Self {
        Self::new(ExtractionStrategy::from_config(cfg)).include_meta(cfg.nlp_uses_meta)
    }

    pub fn days(mut self, selection: DaySelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn include_meta(mut self, include: bool) -> Self {
        self.include_meta = include;
        self
    }

    pub fn strategy(&self) -> &ExtractionStrategy { &self.strategy }

    pub fn build<I>(&self, posts: I) -> Corpus
    where
        I: IntoIterator<Item = Post>,
    {
        let mut corpus = Corpus::default();
        let mut resolved: HashMap<String, TextExtractor> = HashMap::new();
        for post in posts {
            if !self.selection.contains(post.publish_time.date()) {
                continue;
            }
            if post.is_meta() && !self.include_meta {
                continue;
            }
            let extractor = *resolved
                .entry(post.kind.clone())
                .or_insert_with(|| self.strategy.resolve(&post));
            let doc = match extractor.extract(&post) {
                Some(text) => {
                    corpus.words += word_count(&text);
                    corpus.documents.push(text);
                    corpus.doc_to_entry.push(corpus.entries.len());
                    Some(corpus.documents.len() - 1)
                }
                None => None,
            };
            corpus.entries.push(CorpusEntry { post, doc });
        }
        tracing::info!(
            posts = corpus.entries.len(),
            documents = corpus.documents.len(),
            words = corpus.words,
            "built corpus"
        );
        corpus
    }
}
