mod api;
mod config;
mod emoji;
mod error;
mod lexicon;
mod ml;
mod normalize;
mod scoring;
mod twitter;

use std::sync::Arc;

use axum::{
    extract::Request,
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::config::Settings;
use crate::ml::{Classifier, LexiconClassifier, RemoteClassifier};
use crate::normalize::{NormalizeOptions, Normalizer};
use crate::scoring::Scorer;
use crate::twitter::TwitterSource;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::predict_text,
        api::predict_tag,
        api::normalize_text,
        api::health
    ),
    components(
        schemas(
            api::TextForm,
            api::TagForm,
            api::Prediction,
            api::NormalizeResponse,
            api::HealthResponse,
            api::ErrorResponse
        )
    ),
    tags(
        (name = "sentiment", description = "Tweet Sentiment API"),
        (name = "service", description = "Service Status")
    )
)]
struct ApiDoc;

fn build_classifier(settings: &Settings) -> anyhow::Result<Arc<dyn Classifier>> {
    match &settings.classifier_url {
        Some(url) => {
            info!(url = %url, "using remote classifier");
            Ok(Arc::new(RemoteClassifier::new(url.clone(), settings.http_timeout)?))
        }
        None => {
            info!("CLASSIFIER_URL not set, using lexicon classifier");
            Ok(Arc::new(LexiconClassifier::new()))
        }
    }
}

fn router(state: Arc<api::AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/sentiment-bird-swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/predict_text/", post(api::predict_text))
        .route("/predict_tag/", post(api::predict_tag))
        .route("/normalize/", post(api::normalize_text))
        .route("/health", get(api::health))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    dotenv::from_filename("auth.env").ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env();

    let classifier = build_classifier(&settings)?;
    let normalizer = Normalizer::new(NormalizeOptions {
        lemmatize: settings.lemmatize,
    });
    let scorer = Scorer::new(classifier)
        .with_normalizer(normalizer)
        .with_threshold(settings.threshold);
    let source = TwitterSource::new(
        settings.search_url.clone(),
        settings.bearer_token.clone(),
        settings.lang.clone(),
        settings.http_timeout,
    )?;

    info!(?scorer, "pipeline ready");
    let state = Arc::new(api::AppState {
        scorer,
        source: Arc::new(source),
    });

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;

    Ok(())
}
