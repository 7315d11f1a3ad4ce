//! HTTP client for making requests to the search provider

use crate::config::SearchSettings;
use crate::engines::ProviderResponse;
use crate::error::SearchError;
use reqwest::{Client, Response};
use std::time::Duration;

/// Slack added to the transport timeout so the per-call timeout fires first
const TRANSPORT_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// HTTP client wrapper with provider-specific configuration
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SearchError> {
        Self::with_settings(&SearchSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &SearchSettings) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(settings.timeout_duration().saturating_add(TRANSPORT_TIMEOUT_SLACK))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| SearchError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: format!("pai-search/{}", crate::VERSION),
        })
    }

    /// POST a JSON body and collect the response
    pub async fn post_json(
        &self,
        url: &str,
        json: &serde_json::Value,
    ) -> Result<ProviderResponse, SearchError> {
        let response = self
            .client
            .post(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .json(json)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Parse response into ProviderResponse
    async fn parse_response(response: Response) -> Result<ProviderResponse, SearchError> {
        let status = response.status().as_u16();
        let text = response.text().await?;

        Ok(ProviderResponse { status, text })
    }
}
