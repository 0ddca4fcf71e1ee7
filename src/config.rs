//! Service settings from the environment.

use std::time::Duration;

use tracing::warn;

use crate::scoring::DEFAULT_THRESHOLD;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    /// Model-serving sidecar. The keyword classifier is used when unset.
    pub classifier_url: Option<String>,
    pub bearer_token: Option<String>,
    pub search_url: String,
    pub lang: String,
    pub lemmatize: bool,
    pub threshold: f32,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            classifier_url: None,
            bearer_token: None,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            lang: "en".to_string(),
            lemmatize: false,
            threshold: DEFAULT_THRESHOLD,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Malformed values fall back to
    /// the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let threshold = parse_or(get("DECISION_THRESHOLD"), "DECISION_THRESHOLD", defaults.threshold);
        let threshold = if (0.0..=1.0).contains(&threshold) {
            threshold
        } else {
            warn!(threshold, "DECISION_THRESHOLD outside [0, 1], using default");
            defaults.threshold
        };

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            classifier_url: get("CLASSIFIER_URL"),
            // auth.env historically used `bearer-token`
            bearer_token: get("TWITTER_BEARER_TOKEN").or_else(|| get("bearer-token")),
            search_url: get("TWITTER_SEARCH_URL").unwrap_or(defaults.search_url),
            lang: get("TWITTER_LANG").unwrap_or(defaults.lang),
            lemmatize: parse_bool(get("LEMMATIZE"), defaults.lemmatize),
            threshold,
            http_timeout: Duration::from_secs(parse_or(
                get("HTTP_TIMEOUT_SECS"),
                "HTTP_TIMEOUT_SECS",
                defaults.http_timeout.as_secs(),
            )),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid setting, using default");
            default
        }),
        None => default,
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::to_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        Some(other) => {
            warn!(value = other, "invalid LEMMATIZE value, using default");
            default
        }
        None => default,
    }
}
