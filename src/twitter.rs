//! Tweet source backed by the recent-search endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{SentimentError, SentimentResult};

/// Fetches raw tweet texts for a bare hashtag name (no `#`).
#[async_trait]
pub trait TweetSource: Send + Sync {
    async fn fetch(&self, tag: &str) -> SentimentResult<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    // Absent when the search has no matches.
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    text: String,
}

#[derive(Debug, Clone)]
pub struct TwitterSource {
    client: reqwest::Client,
    search_url: String,
    bearer_token: Option<String>,
    lang: String,
}

impl TwitterSource {
    pub fn new(
        search_url: impl Into<String>,
        bearer_token: Option<String>,
        lang: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        if bearer_token.is_none() {
            warn!("no bearer token configured, tag lookups will be rejected upstream");
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            search_url: search_url.into(),
            bearer_token,
            lang: lang.into(),
        })
    }

    /// `{search_url}?query=%23{tag}%20lang%3A{lang}`
    pub fn query_url(&self, tag: &str) -> String {
        let query = format!("#{} lang:{}", tag, self.lang);
        format!("{}?query={}", self.search_url, urlencoding::encode(&query))
    }
}

#[async_trait]
impl TweetSource for TwitterSource {
    async fn fetch(&self, tag: &str) -> SentimentResult<Vec<String>> {
        let url = self.query_url(tag);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!(tag, "tweet search connection failed: {}", e);
            SentimentError::SourceUnavailable {
                status: e.status().map(|s| s.as_u16()).unwrap_or(503),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            warn!(tag, %status, "tweet search failed");
            return Err(SentimentError::SourceUnavailable {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await.map_err(|e| SentimentError::SourceUnavailable {
            status: status.as_u16(),
            message: format!("unreadable search response: {}", e),
        })?;
        debug!(tag, count = body.data.len(), "fetched tweets");
        Ok(body.data.into_iter().map(|t| t.text).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> TwitterSource {
        TwitterSource::new(
            "https://api.twitter.com/2/tweets/search/recent",
            Some("token".to_string()),
            "en",
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_query_url() {
        assert_eq!(
            source().query_url("rustlang"),
            "https://api.twitter.com/2/tweets/search/recent?query=%23rustlang%20lang%3Aen"
        );
    }

    #[test]
    fn test_search_response_without_data() {
        let body: SearchResponse = serde_json::from_str(r#"{"meta": {"result_count": 0}}"#).unwrap();
        assert!(body.data.is_empty());
    }

    #[test]
    fn test_search_response_keeps_order() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"data": [{"id": "1", "text": "first"}, {"id": "2", "text": "second"}]}"#,
        )
        .unwrap();
        let texts: Vec<String> = body.data.into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_unreachable_source_is_unavailable() {
        let source = TwitterSource::new("http://127.0.0.1:9/search", None, "en", Duration::from_secs(1)).unwrap();
        let err = source.fetch("fun").await.unwrap_err();
        assert!(matches!(err, SentimentError::SourceUnavailable { status: 503, .. }));
    }
}
