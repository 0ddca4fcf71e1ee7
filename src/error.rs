//! Error taxonomy for the scoring pipeline.
//!
//! Normalization never fails, so nothing here describes bad input text.
//! Errors only come from the collaborators (classifier, tweet source) or
//! from a broken contract between scorer and assembler.

use thiserror::Error;

/// Failures of the external classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The model-serving endpoint could not be reached.
    #[error("classifier unreachable: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("classifier returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed classifier response: {0}")]
    Malformed(String),

    /// One score per input is required.
    #[error("classifier returned {actual} scores for a batch of {expected}")]
    WrongCount { expected: usize, actual: usize },

    #[error("classifier score {score} at position {index} is outside [0, 1]")]
    OutOfRange { index: usize, score: f32 },
}

#[derive(Debug, Error)]
pub enum SentimentError {
    /// Scorer and assembler disagree on the batch length. Indicates a bug.
    #[error("cannot pair {originals} texts with {labels} labels")]
    LengthMismatch { originals: usize, labels: usize },

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// Tweet fetch failed. Never retried here.
    #[error("tweet source unavailable (status {status}): {message}")]
    SourceUnavailable { status: u16, message: String },
}

pub type SentimentResult<T> = Result<T, SentimentError>;
