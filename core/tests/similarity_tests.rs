use newsnlp_core::config::{NlpConfig, SimilarityPolicy};
use newsnlp_core::corpus::{CorpusBuilder, ExtractionStrategy};
use newsnlp_core::crap::CrapDetector;
use newsnlp_core::grouper::SimilarityGrouper;
use newsnlp_core::tokenizer::Language;
use newsnlp_core::vectorizer::FeatureMatrix;
use newsnlp_core::Post;
use time::macros::datetime;

const DOCS: [&str; 5] = [
    "apple banana cherry",
    "delta echo foxtrot",
    "golf hotel india juliet kilo",
    "lima mike november",
    "golf hotel india juliet oscar",
];

fn matrix() -> FeatureMatrix {
    FeatureMatrix::build(&DOCS, Language::English).unwrap()
}

#[test]
fn overlapping_documents_are_siblings() {
    let m = matrix();
    let res = m.similar_to(2, 0.5, 5).unwrap();
    assert_eq!(res.len(), 1);
    assert_eq!(res[0].doc, 4);
    assert!(res[0].score >= 0.5);
    assert!(m.similar_to(0, 0.5, 5).unwrap().is_empty());
}

#[test]
fn self_similarity_is_one_and_excluded() {
    let m = matrix();
    for i in 0..m.num_docs() {
        assert_eq!(m.similarity(i, i).unwrap(), 1.0);
        assert!(m.similar_to(i, 0.0, 10).unwrap().iter().all(|s| s.doc != i));
    }
}

#[test]
fn similarity_is_symmetric() {
    let m = matrix();
    for i in 0..m.num_docs() {
        for j in 0..m.num_docs() {
            let (a, b) = (m.similarity(i, j).unwrap(), m.similarity(j, i).unwrap());
            assert!((a - b).abs() < 1e-6, "sim({i},{j})={a} sim({j},{i})={b}");
        }
    }
}

#[test]
fn threshold_containment_and_top_n_cap() {
    let docs = [
        "storm coast flood rain",
        "storm coast flood",
        "storm coast",
        "storm",
        "football final",
    ];
    let m = FeatureMatrix::build(&docs, Language::English).unwrap();
    for i in 0..docs.len() {
        let loose = m.similar_to(i, 0.1, 10).unwrap();
        let tight = m.similar_to(i, 0.6, 10).unwrap();
        assert!(tight.iter().all(|t| loose.contains(t)));
        for n in 1..4 {
            assert!(m.similar_to(i, 0.0, n).unwrap().len() <= n);
        }
    }
}

#[test]
fn zero_weight_documents_score_zero() {
    let docs = ["the of and", "is are was", "storm coast"];
    let m = FeatureMatrix::build(&docs, Language::English).unwrap();
    let s = m.similarity(0, 1).unwrap();
    assert_eq!(s, 0.0);
    assert!(!s.is_nan());
}

fn posts() -> Vec<Post> {
    let at = datetime!(2022-05-17 09:00 UTC);
    vec![
        Post::new("p0", "Storm hits the coast", "A violent storm hit the coast overnight flooding roads", at),
        Post::new("p1", "Coast storm floods roads", "The storm flooded coastal roads overnight", at),
        Post::new("p2", "Budget vote delayed", "Parliament delayed the budget vote again", at),
        Post::new("p3", "", "", at),
        Post::new("p4", "Win a free phone", "Click here to win a free phone today", at),
    ]
}

fn config() -> NlpConfig {
    NlpConfig {
        siblings: SimilarityPolicy::new(0.3, 3),
        related: SimilarityPolicy::new(0.05, 3),
        language: Language::English,
        ..NlpConfig::default()
    }
}

#[test]
fn grouper_classifies_siblings_crap_and_unvectorizable() {
    let cfg = config();
    let corpus = CorpusBuilder::new(ExtractionStrategy::from_config(&cfg)).build(posts());
    let m = FeatureMatrix::build(corpus.documents(), cfg.language).unwrap();
    let detector = CrapDetector::new(&["win a free phone click here"], Language::English, 0.5).unwrap();
    let grouper = SimilarityGrouper::new(&corpus, &m, &cfg).unwrap().with_crap_detector(&detector);
    let all = grouper.classify_all().unwrap();

    assert_eq!(all.len(), 5);
    let p0 = &all[0];
    assert_eq!(p0.sibling_ids().collect::<Vec<_>>(), vec!["p1"]);
    assert!(!p0.is_crap);

    let p3 = &all[3];
    assert!(!p3.vectorized);
    assert!(p3.siblings.is_empty() && p3.related.is_empty());

    assert!(all[4].is_crap);
}

#[test]
fn related_excludes_siblings_unless_overlap() {
    let mut cfg = config();
    let corpus = CorpusBuilder::new(ExtractionStrategy::from_config(&cfg)).build(posts());
    let m = FeatureMatrix::build(corpus.documents(), cfg.language).unwrap();

    let exclusive = SimilarityGrouper::new(&corpus, &m, &cfg).unwrap().classify(0).unwrap();
    assert!(exclusive.related_ids().all(|id| id != "p1"));

    cfg.overlap = true;
    let overlapping = SimilarityGrouper::new(&corpus, &m, &cfg).unwrap().classify(0).unwrap();
    assert!(overlapping.related_ids().any(|id| id == "p1"));
}

#[test]
fn banned_keywords_mark_posts_as_crap() {
    let mut cfg = config();
    cfg.crap_banned_keywords = vec!["horoscope".to_string(), "zodiac".to_string()];
    let mut all_posts = posts();
    all_posts[2].keywords = vec!["horoscope".to_string(), "zodiac".to_string()];
    let corpus = CorpusBuilder::new(ExtractionStrategy::from_config(&cfg)).build(all_posts);
    let m = FeatureMatrix::build(corpus.documents(), cfg.language).unwrap();
    let detector = CrapDetector::from_config::<String>(&[], &cfg).unwrap();
    let all = SimilarityGrouper::new(&corpus, &m, &cfg).unwrap().with_crap_detector(&detector).classify_all().unwrap();

    assert!(all[2].is_crap);
    assert!(!all[0].is_crap);
    assert!(!all[4].is_crap);
}
