use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    #[default]
    French,
}

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref EN_STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref FR_STEMMER: Stemmer = Stemmer::create(Algorithm::French);
    static ref EN_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
    static ref FR_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","ai","aie","aient","aies","ait","as","au","aux","avec","avaient","avais","avait","avez","avions","avons","ayant",
            "c'","c'est","ce","ceci","cela","celle","celles","celui","ces","cet","cette","ceux","chez",
            "d'","dans","de","des","du","elle","elles","en","es","est","et","été","étaient","était","êtes","être","eu","eux",
            "il","ils","j'","je","l'","la","le","les","leur","leurs","lui",
            "m'","ma","mais","me","même","mes","moi","mon","n'","ne","nos","notre","nous",
            "on","ont","ou","où","par","pas","pour","qu'","que","qui",
            "s'","sa","sans","se","ses","si","son","sont","sur",
            "t'","ta","te","tes","toi","ton","tu","un","une","vos","votre","vous","y"
        ];
        words.iter().copied().collect()
    };
}

impl Language {
    fn stemmer(self) -> &'static Stemmer {
        match self {
            Language::English => &EN_STEMMER,
            Language::French => &FR_STEMMER,
        }
    }

    fn is_stopword(self, token: &str) -> bool {
        match self {
            Language::English => EN_STOPWORDS.contains(token),
            Language::French => FR_STOPWORDS.contains(token),
        }
    }
}

/// Tokenize text into (term, position) using NFKC normalization, lowercase, stopword removal, and stemming.
pub fn tokenize(text: &str, lang: Language) -> Vec<(String, usize)> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let stemmer = lang.stemmer();
    let mut tokens = Vec::new();
    for (pos, mat) in RE.find_iter(&normalized).enumerate() {
        let token = mat.as_str();
        // French elisions ("l'enquête") keep the article glued to the word.
        let token = match token.split_once('\'') {
            Some((head, tail)) if lang == Language::French && head.chars().count() <= 2 && !tail.is_empty() => tail,
            _ => token,
        };
        if lang.is_stopword(token) { continue; }
        let stem = stemmer.stem(token).to_string();
        tokens.push((stem, pos));
    }
    tokens
}

/// Number of words in `text`, stopwords included.
pub fn word_count(text: &str) -> usize {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!", Language::English);
        assert!(t.iter().any(|(w, _)| w == "run"));
    }

    #[test]
    fn french_elision_and_stopwords() {
        let t = tokenize("L'enquête de la police", Language::French);
        let words: Vec<&str> = t.iter().map(|(w, _)| w.as_str()).collect();
        assert!(!words.contains(&"la"));
        assert!(!words.contains(&"de"));
        assert!(words.iter().any(|w| w.starts_with("enquêt")));
        assert!(words.iter().any(|w| w.starts_with("polic")));
    }

    #[test]
    fn counts_every_word() {
        assert_eq!(word_count("The quick brown fox"), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn word_count_sees_what_tokenize_sees() {
        // Circled letters are symbols until NFKC folds them to plain letters.
        let text = "ⓝⓔⓦⓢ today";
        assert_eq!(word_count(text), 2);
        let positions: Vec<usize> = tokenize(text, Language::English).iter().map(|(_, p)| *p).collect();
        assert_eq!(positions, vec![0, 1]);
    }
}
