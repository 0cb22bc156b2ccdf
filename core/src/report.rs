use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config::NlpConfig;
use crate::corpus::{CorpusBuilder, DaySelection};
use crate::crap::CrapDetector;
use crate::error::Result;
use crate::grouper::{Classification, SimilarityGrouper};
use crate::metapost::{MetaPost, MetaPostAssembler, MetaPostDecision};
use crate::post::{Post, PostId};
use crate::vectorizer::FeatureMatrix;
use crate::versioning::latest_posts;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub vectorized: usize,
    pub words: usize,
    pub crap: usize,
    pub synthesize: usize,
    pub reuse: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub post_id: PostId,
    #[serde(flatten)]
    pub decision: MetaPostDecision,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub created_at: String,
    pub counts: Counts,
    pub classifications: Vec<Classification>,
    pub metaposts: Vec<DecisionRecord>,
    /// Latest post id per short link.
    pub latest: BTreeMap<String, PostId>,
    /// Short links whose every version is disabled.
    pub disabled: Vec<String>,
}

/// One full pass over a day's posts: keep the latest version of each
/// article, vectorize, classify, then decide on metaposts.
pub fn analyze_day(
    posts: &[Post],
    existing: &[MetaPost],
    crap: &CrapDetector,
    selection: DaySelection,
    cfg: &NlpConfig,
) -> Result<DayReport> {
    cfg.validate()?;

    let mut latest: BTreeMap<String, PostId> = BTreeMap::new();
    let mut disabled: Vec<String> = Vec::new();
    let mut superseded: HashSet<&str> = HashSet::new();
    if posts.iter().any(|p| p.short_link.is_some()) {
        let resolution = latest_posts(posts)?;
        for (link, post) in resolution.iter() {
            latest.insert(link.clone(), post.id.clone());
        }
        disabled = resolution.disabled_keys().cloned().collect();
        for post in posts {
            if let Some(link) = &post.short_link {
                if latest.get(link) != Some(&post.id) {
                    superseded.insert(&post.id);
                }
            }
        }
    }

    let current = posts
        .iter()
        .filter(|p| p.version.is_active() && !superseded.contains(p.id.as_str()))
        .cloned();
    let builder = CorpusBuilder::from_config(cfg).days(selection);
    let corpus = builder.build(current);
    let matrix = FeatureMatrix::build(corpus.documents(), cfg.language)?;

    let grouper = SimilarityGrouper::new(&corpus, &matrix, cfg)?.with_crap_detector(crap);
    let classifications = grouper.classify_all()?;

    let assembler = MetaPostAssembler::new(builder.strategy(), cfg, existing)?;
    let metaposts: Vec<DecisionRecord> = assembler
        .decide_all(&corpus, &classifications)
        .into_iter()
        .map(|(post_id, decision)| DecisionRecord { post_id, decision })
        .collect();

    let mut counts = Counts {
        total: corpus.len(),
        vectorized: corpus.num_docs(),
        words: corpus.word_count(),
        crap: classifications.iter().filter(|c| c.is_crap).count(),
        ..Counts::default()
    };
    for record in &metaposts {
        match record.decision {
            MetaPostDecision::Synthesize(_) => counts.synthesize += 1,
            MetaPostDecision::Reuse { .. } => counts.reuse += 1,
            MetaPostDecision::Skip(_) => counts.skipped += 1,
        }
    }

    tracing::info!(
        total = counts.total,
        vectorized = counts.vectorized,
        words = counts.words,
        crap = counts.crap,
        synthesize = counts.synthesize,
        reuse = counts.reuse,
        skipped = counts.skipped,
        superseded = superseded.len(),
        "analyzed day"
    );

    Ok(DayReport {
        created_at: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        counts,
        classifications,
        metaposts,
        latest,
        disabled,
    })
}
