//! Decides whether a sibling group needs a freshly synthesized metapost.
//!
//! A metapost is identified by the seed post whose sibling list produced it.
//! Its content version pairs a fingerprint of the member ids with a revision
//! that grows whenever a member gets a new version. An existing metapost is
//! reused only when it was built from exactly the same members at an equal or
//! greater revision.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use time::OffsetDateTime;

use crate::config::NlpConfig;
use crate::corpus::{add_fullstop, Corpus, ExtractionStrategy};
use crate::error::Result;
use crate::grouper::Classification;
use crate::post::{Post, PostId, Version, METAPOST};
use crate::versioning::{resolve_by_group_key, Versioned};

pub const CATEGORY_NOT_FOUND: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentVersion {
    /// Sum of the active versions of all members.
    pub revision: u64,
    /// SHA-1 over the sorted member ids.
    pub fingerprint: String,
}

impl ContentVersion {
    pub fn of<'p, I>(members: I) -> Self
    where
        I: IntoIterator<Item = &'p Post>,
    {
        let mut revision = 0u64;
        let mut ids: Vec<&str> = Vec::new();
        for post in members {
            revision += post.version.active().map_or(0, |v| u64::from(v.get()));
            ids.push(&post.id);
        }
        ids.sort_unstable();
        let mut hasher = Sha1::new();
        for id in ids {
            hasher.update(id.as_bytes());
            hasher.update(b"\n");
        }
        Self { revision, fingerprint: format!("{:x}", hasher.finalize()) }
    }

    /// Same members, and no member newer than what was summarized.
    pub fn covers(&self, other: &ContentVersion) -> bool {
        self.fingerprint == other.fingerprint && self.revision >= other.revision
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryScores {
    pub summary: f32,
    pub caption: f32,
    pub category: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaPost {
    pub id: PostId,
    /// Id of the seed post this metapost was built from.
    pub group: PostId,
    #[serde(rename = "type")]
    pub kind: String,
    pub siblings: Vec<PostId>,
    #[serde(default)]
    pub related: Vec<PostId>,
    pub content_version: ContentVersion,
    pub summary: String,
    pub caption: String,
    pub category: String,
    #[serde(default)]
    pub scores: SummaryScores,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub publish_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified_time: OffsetDateTime,
}

impl Versioned for MetaPost {
    type Key = PostId;

    fn group_key(&self) -> Option<PostId> { Some(self.group.clone()) }
    fn id(&self) -> &str { &self.id }
    fn version(&self) -> Version {
        Version::from(u32::try_from(self.content_version.revision).unwrap_or(u32::MAX))
    }
    fn timestamp(&self) -> OffsetDateTime { self.modified_time }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NoSiblings,
    Crap,
    BelowMinimumLength { length: usize, minimum: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisRequest {
    pub group: PostId,
    pub kind: String,
    pub siblings: Vec<PostId>,
    pub related: Vec<PostId>,
    pub content_version: ContentVersion,
    /// Seed and sibling texts joined, ready for the summarizer.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum MetaPostDecision {
    Skip(SkipReason),
    Reuse { id: PostId, content_version: ContentVersion },
    Synthesize(SynthesisRequest),
}

pub struct MetaPostAssembler<'a> {
    strategy: &'a ExtractionStrategy,
    summary_minimum_length: usize,
    existing: BTreeMap<PostId, &'a MetaPost>,
}

impl<'a> MetaPostAssembler<'a> {
    pub fn new(strategy: &'a ExtractionStrategy, cfg: &NlpConfig, existing: &'a [MetaPost]) -> Result<Self> {
        let existing = resolve_by_group_key(existing)?.into_latest();
        Ok(Self { strategy, summary_minimum_length: cfg.summary_minimum_length, existing })
    }

    /// Latest known metapost for a seed post.
    pub fn existing(&self, group: &str) -> Option<&'a MetaPost> {
        self.existing.get(group).copied()
    }

    pub fn decide(&self, seed: &Post, siblings: &[&Post], related: &[PostId]) -> MetaPostDecision {
        if siblings.is_empty() {
            return MetaPostDecision::Skip(SkipReason::NoSiblings);
        }

        let content_version = ContentVersion::of(std::iter::once(seed).chain(siblings.iter().copied()));
        if let Some(existing) = self.existing(&seed.id) {
            if existing.content_version.covers(&content_version) {
                tracing::debug!(seed = %seed.id, metapost = %existing.id, "reusing metapost");
                return MetaPostDecision::Reuse { id: existing.id.clone(), content_version: existing.content_version.clone() };
            }
        }

        let text = std::iter::once(seed)
            .chain(siblings.iter().copied())
            .filter_map(|p| self.strategy.metapost_input(p))
            .map(|t| add_fullstop(&t))
            .collect::<Vec<_>>()
            .join(" ");
        let length = text.chars().count();
        if length < self.summary_minimum_length {
            tracing::debug!(seed = %seed.id, length, minimum = self.summary_minimum_length, "text too short for metapost");
            return MetaPostDecision::Skip(SkipReason::BelowMinimumLength { length, minimum: self.summary_minimum_length });
        }

        MetaPostDecision::Synthesize(SynthesisRequest {
            group: seed.id.clone(),
            kind: format!("{METAPOST}.{}", seed.base_kind()),
            siblings: siblings.iter().map(|p| p.id.clone()).collect(),
            related: related.to_vec(),
            content_version,
            text,
        })
    }

    /// One decision per classified post. Crap posts neither seed nor join a group.
    pub fn decide_all(&self, corpus: &Corpus, classifications: &[Classification]) -> Vec<(PostId, MetaPostDecision)> {
        let crap: BTreeSet<&str> = classifications.iter().filter(|c| c.is_crap).map(|c| c.post_id.as_str()).collect();
        classifications
            .iter()
            .filter_map(|c| {
                let seed = corpus.post(&c.post_id)?;
                if c.is_crap {
                    return Some((c.post_id.clone(), MetaPostDecision::Skip(SkipReason::Crap)));
                }
                let siblings: Vec<&Post> = c
                    .sibling_ids()
                    .filter(|id| !crap.contains(id.as_str()))
                    .filter_map(|id| corpus.post(id))
                    .collect();
                let related: Vec<PostId> = c.related_ids().cloned().collect();
                Some((c.post_id.clone(), self.decide(seed, &siblings, &related)))
            })
            .collect()
    }
}

/// Abstractive summarization collaborator.
pub trait Summarizer {
    fn summarize(&self, text: &str) -> Result<Summary>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub summary: String,
    pub caption: String,
    pub category: Option<String>,
    pub scores: SummaryScores,
}

/// Builds the metapost for a synthesis request. `members` must hold the seed
/// and its siblings, most similar sibling first.
pub fn synthesize(
    request: &SynthesisRequest,
    members: &[&Post],
    summarizer: &dyn Summarizer,
    now: OffsetDateTime,
) -> Result<MetaPost> {
    let summary = summarizer.summarize(&request.text)?;

    let by_id: HashMap<&str, &Post> = members.iter().map(|p| (p.id.as_str(), *p)).collect();
    let ordered: Vec<&Post> = std::iter::once(request.group.as_str())
        .chain(request.siblings.iter().map(String::as_str))
        .filter_map(|id| by_id.get(id).copied())
        .collect();

    let keywords: BTreeSet<&String> = ordered.iter().flat_map(|p| p.keywords.iter()).collect();
    let mut images: Vec<String> = Vec::new();
    for image in ordered.iter().skip(1).chain(ordered.first()).flat_map(|p| p.images.iter()) {
        if !images.contains(image) {
            images.push(image.clone());
        }
    }
    let publish_time = ordered.first().map_or(now, |p| p.publish_time);

    Ok(MetaPost {
        id: format!("{METAPOST}-{}", request.content_version.fingerprint),
        group: request.group.clone(),
        kind: request.kind.clone(),
        siblings: request.siblings.clone(),
        related: request.related.clone(),
        content_version: request.content_version.clone(),
        summary: summary.summary,
        caption: summary.caption,
        category: summary.category.unwrap_or_else(|| CATEGORY_NOT_FOUND.to_string()),
        scores: summary.scores,
        keywords: keywords.into_iter().cloned().collect(),
        images,
        is_draft: !ordered.is_empty() && ordered.iter().all(|p| p.is_draft),
        publish_time,
        modified_time: now,
    })
}

/// Overwrites the post's summary, caption and category from its regular text.
/// Returns `false`, leaving the post untouched, when it has no text to summarize.
pub fn summarize_post(post: &mut Post, strategy: &ExtractionStrategy, summarizer: &dyn Summarizer) -> Result<bool> {
    let Some(text) = strategy.resolve(post).extract(post) else {
        return Ok(false);
    };
    let summary = summarizer.summarize(&text)?;
    tracing::debug!(
        post = %post.id,
        summary_score = summary.scores.summary,
        caption_score = summary.scores.caption,
        category_score = summary.scores.category,
        "summarized post"
    );
    post.summary = Some(summary.summary);
    post.caption = Some(summary.caption);
    post.category = Some(summary.category.unwrap_or_else(|| CATEGORY_NOT_FOUND.to_string()));
    Ok(true)
}
