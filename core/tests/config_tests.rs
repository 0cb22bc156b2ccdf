use std::fs;
use tempfile::TempDir;

use newsnlp_core::tokenizer::Language;
use newsnlp_core::{NlpConfig, NlpError, SimilarityPolicy};

#[test]
fn defaults_without_file() {
    let cfg = NlpConfig::load(None).expect("defaults load");
    assert_eq!(cfg.siblings, SimilarityPolicy::new(0.4, 2));
    assert_eq!(cfg.related, SimilarityPolicy::new(0.2, 2));
    assert!(!cfg.overlap);
}

#[test]
fn toml_overrides_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("newsnlp.toml");
    fs::write(
        &path,
        r#"
language = "english"
summary_minimum_length = 51
crap_banned_keywords = ["horoscope", "astrologie"]

[siblings]
threshold = 0.5
top_n = 5
"#,
    )
    .unwrap();

    let cfg = NlpConfig::load(Some(&path)).expect("load");
    assert_eq!(cfg.siblings, SimilarityPolicy::new(0.5, 5));
    assert_eq!(cfg.related, SimilarityPolicy::new(0.2, 2), "untouched keys keep defaults");
    assert_eq!(cfg.language, Language::English);
    assert_eq!(cfg.summary_minimum_length, 51);
    assert_eq!(cfg.crap_banned_keywords, vec!["horoscope", "astrologie"]);
}

#[test]
fn invalid_policy_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.toml");
    fs::write(&path, "[related]\nthreshold = 0.3\ntop_n = 0\n").unwrap();
    assert!(matches!(NlpConfig::load(Some(&path)), Err(NlpError::InvalidPolicy { .. })));
}

#[test]
fn missing_file_is_a_config_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("absent.toml");
    assert!(matches!(NlpConfig::load(Some(&path)), Err(NlpError::Config(_))));
}
