//! Error taxonomy for the search integration layer

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Failures raised while searching
///
/// Every variant is recoverable at the [`SearchManager`](crate::search::SearchManager)
/// boundary except `Configuration`, which is raised while building the manager.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("daily quota of {limit} provider calls exhausted")]
    QuotaExceeded { limit: u32 },

    #[error("provider error ({kind}): {message}")]
    Provider {
        kind: ProviderErrorKind,
        message: String,
    },

    #[error("malformed provider payload: {message}")]
    Parsing { message: String, raw: String },
}

impl SearchError {
    /// Build a provider error, classifying it from the message text
    pub fn provider(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Provider {
            kind: ProviderErrorKind::classify(&message),
            message,
        }
    }

    /// Build a provider error from an HTTP status and response body
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Auth,
            429 => ProviderErrorKind::RateLimited,
            // Tavily answers plan and usage limits with 432/433
            432 | 433 => ProviderErrorKind::QuotaExhausted,
            500..=599 => ProviderErrorKind::Server,
            _ => ProviderErrorKind::classify(body),
        };
        Self::Provider {
            kind,
            message: format!("HTTP {}: {}", status, truncate(body, 200)),
        }
    }

    pub fn parsing(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Parsing {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Whether another attempt at the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { kind, .. } => kind.is_retryable(),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Local daily limit reached, or the provider's own plan limit
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded { .. }
                | Self::Provider {
                    kind: ProviderErrorKind::QuotaExhausted,
                    ..
                }
        )
    }

    /// Short machine-readable label used in logs and HTTP responses
    pub fn label(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Timeout(_) => "timeout",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Provider { .. } => "provider",
            Self::Parsing { .. } => "parsing",
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Provider {
                kind: ProviderErrorKind::Network,
                message: format!("request timed out: {}", err),
            };
        }
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16(), &err.to_string());
        }
        if err.is_connect() || err.is_request() {
            return Self::Provider {
                kind: ProviderErrorKind::Network,
                message: err.to_string(),
            };
        }
        Self::provider(err.to_string())
    }
}

/// Classification of provider-side failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    Auth,
    QuotaExhausted,
    RateLimited,
    Server,
    Network,
    Other,
}

impl ProviderErrorKind {
    /// Classify an error by inspecting its text for quota/auth/rate keywords
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if has(&["quota", "usage limit", "plan limit", "credits"]) {
            Self::QuotaExhausted
        } else if has(&["unauthorized", "forbidden", "api key", "api_key", "invalid key", "auth"]) {
            Self::Auth
        } else if has(&["rate limit", "too many requests", "429"]) {
            Self::RateLimited
        } else if has(&["connection", "dns", "network", "reset by peer"]) {
            Self::Network
        } else if has(&["internal server error", "bad gateway", "service unavailable", "502", "503"]) {
            Self::Server
        } else {
            Self::Other
        }
    }

    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::Server | Self::Network)
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auth => "auth",
            Self::QuotaExhausted => "quota exhausted",
            Self::RateLimited => "rate limited",
            Self::Server => "server",
            Self::Network => "network",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
