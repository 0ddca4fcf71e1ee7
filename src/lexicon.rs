//! Lemmatization and stop-word filtering for the offline preprocessing path.
//!
//! The NLP component sits behind [`Lemmatizer`] so a heavier model can be
//! plugged in. [`LexiconLemmatizer`] is a lightweight rule-based stand-in:
//! an irregular-form table, a few English suffix rules and a fixed stop-word
//! list. No external model files.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+(?:'\w+)?|[^\w\s]").unwrap());

// English stop words
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
        "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during",
        "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her",
        "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into",
        "is", "it", "its", "itself", "just", "me", "more", "most", "my", "myself", "no", "nor",
        "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
        "ourselves", "out", "over", "own", "same", "she", "should", "so", "some", "such",
        "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
        "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
        "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
        "why", "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
        "i'm", "it's", "you're", "we're", "they're", "i've", "i'll", "i'd", "that's",
    ]
    .into_iter()
    .collect()
});

// Forms the suffix rules get wrong
static IRREGULAR_FORMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    vec![
        ("am", "be"), ("is", "be"), ("are", "be"), ("was", "be"), ("were", "be"),
        ("been", "be"), ("being", "be"), ("has", "have"), ("had", "have"),
        ("having", "have"), ("does", "do"), ("did", "do"), ("done", "do"),
        ("goes", "go"), ("went", "go"), ("gone", "go"), ("better", "good"),
        ("best", "good"), ("worse", "bad"), ("worst", "bad"), ("ran", "run"),
        ("made", "make"), ("said", "say"), ("got", "get"), ("felt", "feel"),
        ("thought", "think"), ("saw", "see"), ("seen", "see"), ("took", "take"),
        ("came", "come"), ("gave", "give"), ("knew", "know"), ("told", "tell"),
        ("children", "child"), ("men", "man"), ("women", "woman"), ("feet", "foot"),
        ("teeth", "tooth"), ("mice", "mouse"), ("movies", "movie"), ("cookies", "cookie"),
        ("selfies", "selfie"), ("zombies", "zombie"), ("news", "news"),
    ]
    .into_iter()
    .collect()
});

/// One analyzed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub is_stop: bool,
}

/// External NLP collaborator: tokenizes text and tags base forms and stop
/// words.
pub trait Lemmatizer: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<Token>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconLemmatizer;

impl LexiconLemmatizer {
    pub fn new() -> Self {
        Self
    }

    pub fn lemma(&self, word: &str) -> String {
        if let Some(base) = IRREGULAR_FORMS.get(word) {
            return base.to_string();
        }
        if !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return word.to_string();
        }

        let len = word.len();
        if len > 4 && word.ends_with("ies") {
            return format!("{}y", &word[..len - 3]);
        }
        if word.ends_with("sses") {
            return word[..len - 2].to_string();
        }
        if len > 5 && word.ends_with("ing") {
            return restore_stem(&word[..len - 3]);
        }
        if len > 4 && word.ends_with("ed") && !word.ends_with("eed") {
            return restore_stem(&word[..len - 2]);
        }
        if len > 3
            && word.ends_with('s')
            && !(word.ends_with("ss") || word.ends_with("us") || word.ends_with("is"))
        {
            return word[..len - 1].to_string();
        }
        word.to_string()
    }
}

impl Lemmatizer for LexiconLemmatizer {
    fn analyze(&self, text: &str) -> Vec<Token> {
        TOKEN_REGEX
            .find_iter(text)
            .map(|m| {
                let word = m.as_str();
                Token {
                    text: word.to_string(),
                    lemma: self.lemma(word),
                    is_stop: STOP_WORDS.contains(word),
                }
            })
            .collect()
    }
}

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Undoes consonant doubling ("runn" -> "run") and restores a silent `e` on
/// short consonant-vowel-consonant stems ("lov" -> "love").
fn restore_stem(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 2 {
        let (last, prev) = (bytes[n - 1], bytes[n - 2]);
        if last == prev && !is_vowel(last) && !matches!(last, b'l' | b's' | b'z') {
            return stem[..n - 1].to_string();
        }
    }
    if n == 3
        && !is_vowel(bytes[2])
        && is_vowel(bytes[1])
        && !is_vowel(bytes[0])
        && !matches!(bytes[2], b'w' | b'x' | b'y')
    {
        return format!("{}e", stem);
    }
    stem.to_string()
}

/// Replaces each token of `canonical` with its lemma and drops stop words.
pub fn lemmatize_and_filter(canonical: &str, lemmatizer: &dyn Lemmatizer) -> String {
    lemmatizer
        .analyze(canonical)
        .into_iter()
        .filter(|token| !token.is_stop && !token.lemma.trim().is_empty())
        .map(|token| token.lemma)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_forms() {
        let lex = LexiconLemmatizer::new();
        assert_eq!(lex.lemma("cats"), "cat");
        assert_eq!(lex.lemma("stories"), "story");
        assert_eq!(lex.lemma("classes"), "class");
        assert_eq!(lex.lemma("running"), "run");
        assert_eq!(lex.lemma("looking"), "look");
        assert_eq!(lex.lemma("loved"), "love");
        assert_eq!(lex.lemma("hated"), "hate");
        assert_eq!(lex.lemma("stopped"), "stop");
        assert_eq!(lex.lemma("wanted"), "want");
        assert_eq!(lex.lemma("need"), "need");
        assert_eq!(lex.lemma("this"), "this");
    }

    #[test]
    fn test_irregular_forms() {
        let lex = LexiconLemmatizer::new();
        assert_eq!(lex.lemma("was"), "be");
        assert_eq!(lex.lemma("better"), "good");
        assert_eq!(lex.lemma("movies"), "movie");
    }

    #[test]
    fn test_analyze_tokens() {
        let tokens = LexiconLemmatizer::new().analyze("i don't like it!!");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["i", "don't", "like", "it", "!", "!"]);
        assert!(tokens[0].is_stop);
        assert!(!tokens[2].is_stop);
    }

    #[test]
    fn test_lemmatize_and_filter() {
        let lex = LexiconLemmatizer::new();
        assert_eq!(
            lemmatize_and_filter("i was running to the shops smile", &lex),
            "run shop smile"
        );
        assert_eq!(lemmatize_and_filter("", &lex), "");
        assert_eq!(lemmatize_and_filter("the and of", &lex), "");
    }

    struct UpperLemmatizer;

    impl Lemmatizer for UpperLemmatizer {
        fn analyze(&self, text: &str) -> Vec<Token> {
            text.split_whitespace()
                .map(|w| Token {
                    text: w.to_string(),
                    lemma: w.to_uppercase(),
                    is_stop: w == "skip",
                })
                .collect()
        }
    }

    #[test]
    fn test_custom_lemmatizer() {
        assert_eq!(lemmatize_and_filter("keep skip this", &UpperLemmatizer), "KEEP THIS");
    }
}
