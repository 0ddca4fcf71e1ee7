//! HTTP handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::SentimentError;
use crate::scoring::{ScoredItem, Scorer};
use crate::twitter::TweetSource;

pub struct AppState {
    pub scorer: Scorer,
    pub source: Arc<dyn TweetSource>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TextForm {
    #[schema(example = "I loooove this!!! :) #fun")]
    pub text: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagForm {
    /// Hashtag name, with or without the leading `#`.
    #[schema(example = "rustlang")]
    pub tag: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Prediction {
    /// The text exactly as supplied or fetched.
    pub body: String,
    /// 1 = positive, 0 = negative.
    #[schema(example = 1)]
    pub sentiment: u8,
}

impl From<ScoredItem> for Prediction {
    fn from(item: ScoredItem) -> Self {
        Prediction {
            body: item.original,
            sentiment: item.label.label(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct NormalizeResponse {
    pub text: String,
    pub normalized: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub classifier: String,
    pub lemmatize: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Pipeline(SentimentError),
}

impl From<SentimentError> for ApiError {
    fn from(err: SentimentError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(SentimentError::SourceUnavailable { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(SentimentError::Classifier(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(SentimentError::LengthMismatch { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Pipeline(err) => err.to_string(),
        };
        if status.is_server_error() {
            warn!(%status, "request failed: {}", message);
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Score a single text.
#[utoipa::path(
    post,
    path = "/predict_text/",
    request_body(content = TextForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "One-element list with the label", body = [Prediction]),
        (status = 503, description = "Classifier unavailable", body = ErrorResponse)
    ),
    tag = "sentiment"
)]
pub async fn predict_text(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TextForm>,
) -> Result<Json<Vec<Prediction>>, ApiError> {
    let item = state.scorer.score_text(&form.text).await?;
    Ok(Json(vec![item.into()]))
}

/// Fetch recent tweets for a hashtag and score each one.
#[utoipa::path(
    post,
    path = "/predict_tag/",
    request_body(content = TagForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Labels in fetch order", body = [Prediction]),
        (status = 400, description = "Empty tag", body = ErrorResponse),
        (status = 502, description = "Tweet source unavailable", body = ErrorResponse),
        (status = 503, description = "Classifier unavailable", body = ErrorResponse)
    ),
    tag = "sentiment"
)]
pub async fn predict_tag(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TagForm>,
) -> Result<Json<Vec<Prediction>>, ApiError> {
    let tag = form.tag.trim().trim_start_matches('#');
    if tag.is_empty() {
        return Err(ApiError::BadRequest("tag must not be empty".to_string()));
    }

    let items = state.scorer.score_tag(state.source.as_ref(), tag).await?;
    info!(tag, count = items.len(), "scored tag");
    Ok(Json(items.into_iter().map(Prediction::from).collect()))
}

/// Show the canonical form the classifier receives.
#[utoipa::path(
    post,
    path = "/normalize/",
    request_body(content = TextForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 200, body = NormalizeResponse)),
    tag = "sentiment"
)]
pub async fn normalize_text(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TextForm>,
) -> Json<NormalizeResponse> {
    let normalized = state.scorer.normalizer().normalize(&form.text);
    Json(NormalizeResponse {
        text: form.text,
        normalized,
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, body = HealthResponse)),
    tag = "service"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        classifier: state.scorer.classifier_name().to_string(),
        lemmatize: state.scorer.normalizer().lemmatizes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClassifierError, SentimentResult};
    use crate::ml::{Classifier, LexiconClassifier};
    use async_trait::async_trait;

    struct StaticSource(Vec<String>);

    #[async_trait]
    impl TweetSource for StaticSource {
        async fn fetch(&self, _tag: &str) -> SentimentResult<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct DownSource;

    #[async_trait]
    impl TweetSource for DownSource {
        async fn fetch(&self, _tag: &str) -> SentimentResult<Vec<String>> {
            Err(SentimentError::SourceUnavailable {
                status: 429,
                message: "Too Many Requests".to_string(),
            })
        }
    }

    struct DownClassifier;

    #[async_trait]
    impl Classifier for DownClassifier {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn predict(&self, _batch: &[String]) -> Result<Vec<f32>, ClassifierError> {
            Err(ClassifierError::Transport("connection refused".to_string()))
        }
    }

    fn state(source: impl TweetSource + 'static) -> State<Arc<AppState>> {
        State(Arc::new(AppState {
            scorer: Scorer::new(Arc::new(LexiconClassifier::new())),
            source: Arc::new(source),
        }))
    }

    #[tokio::test]
    async fn test_predict_text_returns_original_body() {
        let form = Form(TextForm {
            text: "Sooo happy today :D".to_string(),
        });
        let Json(out) = predict_text(state(StaticSource(Vec::new())), form).await.unwrap();
        assert_eq!(
            out,
            vec![Prediction {
                body: "Sooo happy today :D".to_string(),
                sentiment: 1,
            }]
        );
    }

    #[tokio::test]
    async fn test_predict_tag_keeps_fetch_order() {
        let source = StaticSource(vec![
            "This is awful :(".to_string(),
            "great game tonight!".to_string(),
        ]);
        let form = Form(TagForm {
            tag: "#nba".to_string(),
        });
        let Json(out) = predict_tag(state(source), form).await.unwrap();
        let labels: Vec<(&str, u8)> = out.iter().map(|p| (p.body.as_str(), p.sentiment)).collect();
        assert_eq!(labels, vec![("This is awful :(", 0), ("great game tonight!", 1)]);
    }

    #[tokio::test]
    async fn test_predict_tag_rejects_empty_tag() {
        let form = Form(TagForm { tag: " # ".to_string() });
        let err = predict_tag(state(StaticSource(Vec::new())), form).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_source_failure_maps_to_bad_gateway() {
        let form = Form(TagForm { tag: "fun".to_string() });
        let err = predict_tag(state(DownSource), form).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_classifier_failure_maps_to_service_unavailable() {
        let state = State(Arc::new(AppState {
            scorer: Scorer::new(Arc::new(DownClassifier)),
            source: Arc::new(StaticSource(Vec::new())),
        }));
        let form = Form(TextForm { text: "hi".to_string() });
        let err = predict_text(state, form).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_normalize_endpoint() {
        let form = Form(TextForm {
            text: "@bob THIS is gooood &amp; fun https://t.co/abc".to_string(),
        });
        let Json(out) = normalize_text(state(StaticSource(Vec::new())), form).await;
        assert_eq!(out.normalized, "this is good and fun");
    }

    #[tokio::test]
    async fn test_health() {
        let Json(out) = health(state(StaticSource(Vec::new()))).await;
        assert_eq!(out.status, "ok");
        assert_eq!(out.classifier, "lexicon");
        assert!(!out.lemmatize);
    }
}
