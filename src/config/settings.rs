//! Settings structures for pai-search configuration

use crate::error::SearchError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Longest provider timeout `validate` accepts, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub cache: CacheSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (TAVILY_* and PAI_SEARCH_* prefixes)
    pub fn merge_env(&mut self) {
        self.merge_from(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary variable lookup
    pub(crate) fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("TAVILY_API_KEY") {
            let val = val.trim().to_string();
            self.search.api_key = if val.is_empty() { None } else { Some(val) };
        }
        if let Some(val) = lookup("TAVILY_BASE_URL") {
            self.search.base_url = val;
        }
        if let Some(val) = parsed(&lookup, "TAVILY_MAX_RESULTS") {
            self.search.max_results = val;
        }
        if let Some(val) = parsed(&lookup, "TAVILY_SEARCH_DEPTH") {
            self.search.search_depth = val;
        }
        if let Some(val) = parsed(&lookup, "TAVILY_TOPIC") {
            self.search.topic = val;
        }
        if let Some(val) = parsed(&lookup, "TAVILY_TIMEOUT") {
            self.search.timeout = val;
        }
        if let Some(val) = parsed(&lookup, "TAVILY_DAILY_QUOTA") {
            self.search.daily_quota = val;
        }
        if let Some(val) = parsed(&lookup, "TAVILY_MAX_RETRIES") {
            self.search.max_retries = val;
        }
        if let Some(val) = parsed(&lookup, "TAVILY_CACHE_ENABLED") {
            self.cache.enabled = val;
        }
        if let Some(val) = parsed(&lookup, "TAVILY_CACHE_TTL") {
            self.cache.ttl = val;
        }
        if let Some(val) = parsed(&lookup, "PAI_SEARCH_PORT") {
            self.server.port = val;
        }
        if let Some(val) = lookup("PAI_SEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
    }

    /// Reject settings the search layer cannot run with
    pub fn validate(&self) -> std::result::Result<(), SearchError> {
        if self.search.max_results == 0 {
            return Err(SearchError::Configuration(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        if self.search.timeout == 0 {
            return Err(SearchError::Configuration(
                "search.timeout must be at least 1 second".to_string(),
            ));
        }
        if self.search.timeout > MAX_TIMEOUT_SECS {
            return Err(SearchError::Configuration(format!(
                "search.timeout must be at most {} seconds",
                MAX_TIMEOUT_SECS
            )));
        }
        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(SearchError::Configuration(
                "cache.max_entries must be at least 1 when caching is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(val) => Some(val),
        Err(_) => {
            warn!("Ignoring unparseable value {:?} for {}", raw, key);
            None
        }
    }
}

/// Provider search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Tavily API key
    pub api_key: Option<String>,
    /// Provider base URL
    pub base_url: String,
    /// Maximum results returned per query
    pub max_results: usize,
    /// Provider search depth
    pub search_depth: SearchDepth,
    /// Provider topic
    pub topic: SearchTopic,
    /// Provider call timeout in seconds
    pub timeout: u64,
    /// Domains the provider should restrict results to
    pub include_domains: Vec<String>,
    /// Domains removed from results
    pub exclude_domains: Vec<String>,
    /// Daily cap on provider calls
    pub daily_quota: u32,
    /// Retries for rate-limit, server and network failures
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries
    pub retry_base_delay_ms: u64,
    /// Concurrency bound for batch searches
    pub batch_max_concurrent: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tavily.com".to_string(),
            max_results: 5,
            search_depth: SearchDepth::Advanced,
            topic: SearchTopic::General,
            timeout: 30,
            include_domains: vec!["*.go.kr".to_string(), "*.or.kr".to_string()],
            exclude_domains: vec![],
            daily_quota: 1000,
            max_retries: 2,
            retry_base_delay_ms: 500,
            batch_max_concurrent: 3,
        }
    }
}

impl SearchSettings {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Search depth requested from the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    #[default]
    Advanced,
}

impl FromStr for SearchDepth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!("unknown search depth: {}", other)),
        }
    }
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => f.write_str("basic"),
            Self::Advanced => f.write_str("advanced"),
        }
    }
}

/// Provider topic category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    #[default]
    General,
    News,
    Finance,
}

impl FromStr for SearchTopic {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(Self::General),
            "news" => Ok(Self::News),
            "finance" => Ok(Self::Finance),
            other => Err(format!("unknown topic: {}", other)),
        }
    }
}

/// Result cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Enable the result cache
    pub enabled: bool,
    /// Entry lifetime in seconds
    pub ttl: u64,
    /// Entry count ceiling
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: 3600,
            max_entries: 1000,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8890,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.search.api_key.is_none());
        assert_eq!(settings.search.max_results, 5);
        assert_eq!(settings.search.search_depth, SearchDepth::Advanced);
        assert_eq!(settings.search.timeout, 30);
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.ttl, 3600);
        assert_eq!(settings.search.include_domains, vec!["*.go.kr", "*.or.kr"]);
    }

    #[test]
    fn test_merge_env_overrides() {
        let vars = env(&[
            ("TAVILY_API_KEY", "tvly-test"),
            ("TAVILY_MAX_RESULTS", "8"),
            ("TAVILY_SEARCH_DEPTH", "basic"),
            ("TAVILY_TIMEOUT", "10"),
            ("TAVILY_CACHE_ENABLED", "false"),
            ("TAVILY_CACHE_TTL", "60"),
        ]);
        let mut settings = Settings::default();
        settings.merge_from(|k| vars.get(k).cloned());

        assert_eq!(settings.search.api_key.as_deref(), Some("tvly-test"));
        assert_eq!(settings.search.max_results, 8);
        assert_eq!(settings.search.search_depth, SearchDepth::Basic);
        assert_eq!(settings.search.timeout, 10);
        assert!(!settings.cache.enabled);
        assert_eq!(settings.cache.ttl, 60);
    }

    #[test]
    fn test_merge_env_ignores_garbage() {
        let vars = env(&[("TAVILY_MAX_RESULTS", "many"), ("TAVILY_SEARCH_DEPTH", "deep")]);
        let mut settings = Settings::default();
        settings.merge_from(|k| vars.get(k).cloned());

        assert_eq!(settings.search.max_results, 5);
        assert_eq!(settings.search.search_depth, SearchDepth::Advanced);
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let vars = env(&[("TAVILY_API_KEY", "   ")]);
        let mut settings = Settings::default();
        settings.merge_from(|k| vars.get(k).cloned());
        assert!(settings.search.api_key.is_none());
    }

    #[test]
    fn test_yaml_partial_file() {
        let yaml = "search:\n  max_results: 3\n  search_depth: basic\ncache:\n  ttl: 10\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.search.max_results, 3);
        assert_eq!(settings.search.search_depth, SearchDepth::Basic);
        assert_eq!(settings.search.timeout, 30);
        assert_eq!(settings.cache.ttl, 10);
        assert!(settings.cache.enabled);
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.search.max_results = 0;
        assert!(matches!(
            settings.validate(),
            Err(SearchError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let mut settings = Settings::default();
        settings.search.timeout = MAX_TIMEOUT_SECS;
        assert!(settings.validate().is_ok());

        settings.search.timeout = u64::MAX;
        assert!(matches!(
            settings.validate(),
            Err(SearchError::Configuration(_))
        ));
    }
}
