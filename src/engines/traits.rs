//! Provider traits and types

use crate::config::{SearchDepth, SearchSettings, SearchTopic};
use crate::error::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request sent to the search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Trimmed, non-normalized query text
    pub query: String,
    pub search_depth: SearchDepth,
    pub max_results: usize,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub include_images: bool,
    pub topic: SearchTopic,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_domains: Vec<String>,
}

impl ProviderRequest {
    /// Create request parameters with default provider options
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_depth: SearchDepth::default(),
            max_results: 5,
            include_answer: true,
            include_raw_content: false,
            include_images: false,
            topic: SearchTopic::default(),
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
        }
    }

    /// Create request parameters from search settings
    pub fn from_settings(query: impl Into<String>, settings: &SearchSettings) -> Self {
        Self {
            search_depth: settings.search_depth,
            max_results: settings.max_results,
            topic: settings.topic,
            include_domains: settings.include_domains.clone(),
            exclude_domains: settings.exclude_domains.clone(),
            ..Self::new(query)
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// HTTP response from a provider request
#[derive(Debug)]
pub struct ProviderResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl ProviderResponse {
    /// Parse response as JSON, keeping the raw body on failure
    pub fn json(&self) -> Result<serde_json::Value, SearchError> {
        serde_json::from_str(&self.text)
            .map_err(|e| SearchError::parsing(format!("invalid JSON: {}", e), self.text.clone()))
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// External web-search provider
///
/// Implementations return the raw JSON payload; parsing and ranking happen in
/// the search manager.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Execute one search call
    async fn search(&self, request: &ProviderRequest) -> Result<serde_json::Value, SearchError>;
}
