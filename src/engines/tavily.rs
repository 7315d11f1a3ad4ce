//! Tavily search API engine

use super::traits::*;
use crate::config::SearchSettings;
use crate::error::SearchError;
use crate::network::HttpClient;
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// Tavily web search
#[derive(Clone)]
pub struct Tavily {
    client: HttpClient,
    api_key: String,
    endpoint: String,
}

impl Tavily {
    /// Build the engine; fails when no API key is configured
    pub fn new(settings: &SearchSettings) -> Result<Self, SearchError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SearchError::Configuration("TAVILY_API_KEY is not set".to_string()))?
            .to_string();

        let endpoint = search_endpoint(&settings.base_url)?;
        let client = HttpClient::with_settings(settings)?;

        Ok(Self {
            client,
            api_key,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn search_endpoint(base_url: &str) -> Result<String, SearchError> {
    let base = Url::parse(base_url)
        .map_err(|e| SearchError::Configuration(format!("invalid base_url {:?}: {}", base_url, e)))?;
    let mut endpoint = base.to_string();
    if !endpoint.ends_with('/') {
        endpoint.push('/');
    }
    endpoint.push_str("search");
    Ok(endpoint)
}

#[async_trait]
impl SearchProvider for Tavily {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, request: &ProviderRequest) -> Result<serde_json::Value, SearchError> {
        let mut body = serde_json::to_value(request)
            .map_err(|e| SearchError::provider(format!("failed to encode request: {}", e)))?;
        if let Some(object) = body.as_object_mut() {
            object.insert(
                "api_key".to_string(),
                serde_json::Value::String(self.api_key.clone()),
            );
        }

        debug!("Tavily search '{}' ({})", request.query, request.search_depth);
        let response = self.client.post_json(&self.endpoint, &body).await?;

        if !response.is_success() {
            return Err(SearchError::from_status(response.status, &response.text));
        }

        response.json()
    }
}
