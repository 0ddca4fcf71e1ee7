//! Sentiment classifiers.
//!
//! The scorer treats a classifier as a black box mapping a batch of
//! canonical texts to one probability-of-positive per text. Two backends:
//!
//! - [`RemoteClassifier`] posts the batch to a model-serving sidecar
//!   (the trained network lives there, weights and vectorizer included).
//! - [`LexiconClassifier`] is a keyword scorer for running without the
//!   sidecar. No external ML dependencies.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ClassifierError;

// Positive words, including the words the emoji resolver emits
static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
        "outstanding", "brilliant", "love", "loved", "loving", "loves", "best", "better",
        "positive", "happy", "joy", "joyful", "beautiful", "perfect", "awesome",
        "incredible", "delightful", "pleasant", "satisfied", "recommend", "impressive",
        "exceptional", "success", "win", "winning", "helpful", "fun", "enjoy", "enjoyed",
        "glad", "excited", "cool", "nice", "thanks", "thank", "lol", "yay", "congrats",
        "smile", "smiling", "laugh", "laughing", "wink", "grinning", "heart", "hearts",
        "party",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate",
        "hated", "hating", "hates", "dislike", "disappointing", "disappointed", "failure",
        "failed", "fail", "negative", "sad", "unhappy", "angry", "annoyed", "frustrated",
        "frustrating", "problem", "broken", "crash", "error", "wrong", "useless", "waste",
        "scam", "fake", "slow", "expensive", "garbage", "trash", "pathetic", "mediocre",
        "afraid", "sick", "tired", "bored", "boring", "ugh", "sucks", "miss", "lost",
        "frown", "frowning", "cry", "crying", "unsure", "tears", "pouting",
    ]
    .into_iter()
    .collect()
});

/// Maps canonical texts to scores in `[0, 1]`, one per input, in order.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short backend name for health output and logs.
    fn name(&self) -> &'static str;

    async fn predict(&self, batch: &[String]) -> Result<Vec<f32>, ClassifierError>;
}

/// Keyword-counting classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Laplace-smoothed share of positive words. Text with no sentiment
    /// words scores exactly 0.5.
    pub fn score(&self, text: &str) -> f32 {
        let words = text.split(|c: char| !c.is_alphabetic()).filter(|w| !w.is_empty());
        let (mut positive, mut negative) = (0usize, 0usize);
        for word in words {
            if POSITIVE_WORDS.contains(word) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(word) {
                negative += 1;
            }
        }
        (positive as f32 + 1.0) / ((positive + negative) as f32 + 2.0)
    }
}

#[async_trait]
impl Classifier for LexiconClassifier {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    async fn predict(&self, batch: &[String]) -> Result<Vec<f32>, ClassifierError> {
        Ok(batch.iter().map(|text| self.score(text)).collect())
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    scores: Vec<f32>,
}

/// Calls the model-serving sidecar: `POST {endpoint}` with
/// `{"texts": [...]}`, expecting `{"scores": [...]}` back.
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn predict(&self, batch: &[String]) -> Result<Vec<f32>, ClassifierError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest { texts: batch })
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, "classifier connection failed: {}", e);
                ClassifierError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(endpoint = %self.endpoint, %status, "classifier request failed");
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<PredictResponse>()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;
        Ok(body.scores)
    }
}

/// Checks that `scores` has one finite value in `[0, 1]` per input.
pub fn validate_scores(expected: usize, scores: &[f32]) -> Result<(), ClassifierError> {
    if scores.len() != expected {
        return Err(ClassifierError::WrongCount {
            expected,
            actual: scores.len(),
        });
    }
    match scores
        .iter()
        .enumerate()
        .find(|(_, s)| !s.is_finite() || **s < 0.0 || **s > 1.0)
    {
        Some((index, &score)) => Err(ClassifierError::OutOfRange { index, score }),
        None => Ok(()),
    }
}
