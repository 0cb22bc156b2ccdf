use newsnlp_core::tokenizer::{tokenize, Language};

#[test]
fn it_normalizes_and_stems() {
    let toks = tokenize("Running Runners RUN! The café's menu.", Language::English);
    let words: Vec<String> = toks.into_iter().map(|(w, _)| w).collect();
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // Possessive stripped, lowercased
    assert!(words.iter().any(|w| w.starts_with("caf")));
    assert!(!words.iter().any(|w| w.ends_with("'s")));
}

#[test]
fn it_filters_stopwords() {
    let toks = tokenize("The quick brown fox and the lazy dog", Language::English);
    let words: Vec<String> = toks.into_iter().map(|(w, _)| w).collect();
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
}

#[test]
fn positions_count_stopwords() {
    let toks = tokenize("the storm", Language::English);
    assert_eq!(toks, vec![("storm".to_string(), 1)]);
}
