//! Tweet text normalization.
//!
//! Rewrites raw social-media text into the canonical form the classifier
//! was trained on. The nine stages run in a fixed order; each stage's
//! patterns assume the output of the previous one.
//!
//! Canonical text is lower-case, has no character repeated more than twice
//! in a row, no URLs, hashtags, mentions or non-ASCII tokens, and no run of
//! two or more whitespace characters. It may be empty.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::emoji;
use crate::lexicon::{lemmatize_and_filter, Lemmatizer, LexiconLemmatizer};

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static HASHTAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\S+|\s#\S+").unwrap());
static MENTION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@\S+|\s@\S+").unwrap());
// Whole tokens are dropped, accented words included.
static NON_ASCII_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w*[^\x00-\x7F]+\w*").unwrap());
static WHITESPACE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").unwrap());

/// HTML entities decoded by [`Stage::DecodeEntities`]. Anything else is left
/// as literal text.
const HTML_ENTITIES: &[(&str, &str)] = &[("&amp;", "and "), ("&quot;", ""), ("&gt;", "")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CaseFold,
    CollapseLengthening,
    StripUrls,
    StripHashtags,
    StripMentions,
    ResolveEmoji,
    DecodeEntities,
    StripNonAscii,
    CollapseWhitespace,
}

impl Stage {
    /// Stages in the only order they may run in.
    pub const ALL: [Stage; 9] = [
        Stage::CaseFold,
        Stage::CollapseLengthening,
        Stage::StripUrls,
        Stage::StripHashtags,
        Stage::StripMentions,
        Stage::ResolveEmoji,
        Stage::DecodeEntities,
        Stage::StripNonAscii,
        Stage::CollapseWhitespace,
    ];

    pub fn apply(self, text: &str) -> String {
        match self {
            Stage::CaseFold => text.to_lowercase(),
            Stage::CollapseLengthening => collapse_lengthening(text),
            Stage::StripUrls => URL_REGEX.replace_all(text, " ").into_owned(),
            Stage::StripHashtags => HASHTAG_REGEX.replace_all(text, " ").into_owned(),
            Stage::StripMentions => MENTION_REGEX.replace_all(text, " ").into_owned(),
            Stage::ResolveEmoji => emoji::resolve(text),
            Stage::DecodeEntities => HTML_ENTITIES
                .iter()
                .fold(text.to_string(), |acc, (entity, replacement)| acc.replace(entity, replacement)),
            Stage::StripNonAscii => NON_ASCII_TOKEN_REGEX.replace_all(text, " ").into_owned(),
            Stage::CollapseWhitespace => WHITESPACE_RUN_REGEX.replace_all(text, " ").trim().to_string(),
        }
    }
}

/// Collapses any run of three or more identical characters to two.
///
/// Lossy: "hiiiii" becomes "hii", not "hi". Newlines are not collapsed here;
/// whitespace runs are handled by the final stage.
pub(crate) fn collapse_lengthening(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut run = 0usize;
    for c in text.chars() {
        if Some(c) == prev {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run <= 2 || c == '\n' {
            out.push(c);
        }
    }
    out
}

/// Runs all nine stages over `text`.
pub fn normalize(text: &str) -> String {
    Stage::ALL.iter().fold(text.to_string(), |acc, stage| stage.apply(&acc))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Lemmatize and drop stop words after the nine stages.
    pub lemmatize: bool,
}

/// Normalizer configured with the optional lemmatization post-stage.
#[derive(Clone)]
pub struct Normalizer {
    lemmatizer: Option<Arc<dyn Lemmatizer>>,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        if options.lemmatize {
            Self::with_lemmatizer(Arc::new(LexiconLemmatizer::new()))
        } else {
            Self::plain()
        }
    }

    /// Stages 1-9 only.
    pub fn plain() -> Self {
        Self { lemmatizer: None }
    }

    pub fn with_lemmatizer(lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        Self {
            lemmatizer: Some(lemmatizer),
        }
    }

    pub fn lemmatizes(&self) -> bool {
        self.lemmatizer.is_some()
    }

    pub fn normalize(&self, text: &str) -> String {
        let canonical = normalize(text);
        match &self.lemmatizer {
            Some(lemmatizer) => lemmatize_and_filter(&canonical, lemmatizer.as_ref()),
            None => canonical,
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::plain()
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("lemmatize", &self.lemmatizes())
            .finish()
    }
}
