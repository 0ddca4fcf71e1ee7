//! Batch scoring and result assembly.
//!
//! One classifier call per request: a batch of N texts is normalized, sent
//! to the classifier as a single batch, thresholded, and paired back with
//! the original (not normalized) texts in input order.

use std::sync::Arc;

use tracing::debug;

use crate::error::{SentimentError, SentimentResult};
use crate::ml::{validate_scores, Classifier};
use crate::normalize::Normalizer;
use crate::twitter::TweetSource;

pub const DEFAULT_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    /// `0` for negative, `1` for positive.
    pub fn label(self) -> u8 {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Positive => 1,
        }
    }
}

/// Scores at or above `threshold` are positive.
pub fn label_for(score: f32, threshold: f32) -> Sentiment {
    if score < threshold {
        Sentiment::Negative
    } else {
        Sentiment::Positive
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredItem {
    pub original: String,
    pub label: Sentiment,
}

/// Pairs each original text with its label, position by position.
pub fn assemble(originals: Vec<String>, labels: Vec<Sentiment>) -> SentimentResult<Vec<ScoredItem>> {
    if originals.len() != labels.len() {
        return Err(SentimentError::LengthMismatch {
            originals: originals.len(),
            labels: labels.len(),
        });
    }
    Ok(originals
        .into_iter()
        .zip(labels)
        .map(|(original, label)| ScoredItem { original, label })
        .collect())
}

/// Normalizer + classifier + decision threshold.
///
/// Stateless per call; the classifier is shared read-only.
#[derive(Clone)]
pub struct Scorer {
    normalizer: Normalizer,
    classifier: Arc<dyn Classifier>,
    threshold: f32,
}

impl Scorer {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            normalizer: Normalizer::plain(),
            classifier,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Normalizes every text (empty results included), classifies the whole
    /// batch in one call and thresholds the scores.
    pub async fn score_batch(&self, texts: &[String]) -> SentimentResult<Vec<Sentiment>> {
        let normalized: Vec<String> = texts.iter().map(|t| self.normalizer.normalize(t)).collect();
        let scores = self.classifier.predict(&normalized).await?;
        validate_scores(normalized.len(), &scores)?;

        let labels: Vec<Sentiment> = scores.iter().map(|s| label_for(*s, self.threshold)).collect();
        debug!(
            batch = labels.len(),
            positive = labels.iter().filter(|l| **l == Sentiment::Positive).count(),
            classifier = self.classifier.name(),
            "scored batch"
        );
        Ok(labels)
    }

    pub async fn score_text(&self, text: &str) -> SentimentResult<ScoredItem> {
        let originals = vec![text.to_string()];
        let labels = self.score_batch(&originals).await?;
        assemble(originals, labels)?
            .pop()
            .ok_or(SentimentError::LengthMismatch { originals: 1, labels: 0 })
    }

    /// Fetches the tweets for `tag` and scores them in fetch order.
    pub async fn score_tag(&self, source: &dyn TweetSource, tag: &str) -> SentimentResult<Vec<ScoredItem>> {
        let tag = tag.trim().trim_start_matches('#');
        let tweets = source.fetch(tag).await?;
        let labels = self.score_batch(&tweets).await?;
        assemble(tweets, labels)
    }
}

impl std::fmt::Debug for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer")
            .field("normalizer", &self.normalizer)
            .field("classifier", &self.classifier.name())
            .field("threshold", &self.threshold)
            .finish()
    }
}
