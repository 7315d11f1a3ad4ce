//! Conversion of raw provider payloads into [`SearchResult`] records

use super::types::SearchResult;
use crate::error::SearchError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Items with a shorter body are dropped as low quality
pub const MIN_BODY_CHARS: usize = 10;

/// Parser for Tavily-shaped responses: `{"results": [{title, content, url}, ...]}`
#[derive(Debug, Clone, Copy)]
pub struct ResultParser {
    retrieved_at: DateTime<Utc>,
}

impl ResultParser {
    /// Parser stamping ids with the given retrieval time
    pub fn at(retrieved_at: DateTime<Utc>) -> Self {
        Self { retrieved_at }
    }

    /// Parser stamping ids with the current time
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }

    /// Parse a raw response
    ///
    /// Only a malformed top level is an error. Items that are incomplete or
    /// too short are skipped.
    pub fn parse(&self, raw: &Value) -> Result<Vec<SearchResult>, SearchError> {
        let object = raw.as_object().ok_or_else(|| {
            SearchError::parsing(
                format!("expected a JSON object, found {}", kind_of(raw)),
                raw.to_string(),
            )
        })?;

        let items = match object.get("results") {
            None => {
                warn!("Provider response has no \"results\" field");
                return Ok(Vec::new());
            }
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(SearchError::parsing(
                    format!("\"results\" must be an array, found {}", kind_of(other)),
                    raw.to_string(),
                ))
            }
        };

        let stamp = self.retrieved_at.timestamp_millis();
        let results: Vec<SearchResult> = items
            .iter()
            .enumerate()
            .filter_map(|(ordinal, item)| parse_item(ordinal, item, stamp))
            .collect();

        debug!(
            "Parsed {} of {} provider items",
            results.len(),
            items.len()
        );
        Ok(results)
    }
}

impl Default for ResultParser {
    fn default() -> Self {
        Self::now()
    }
}

fn parse_item(ordinal: usize, item: &Value, stamp: i64) -> Option<SearchResult> {
    let title = item.get("title")?.as_str()?.trim();
    let body = item.get("content")?.as_str()?.trim();
    let url = item.get("url")?.as_str()?.trim();

    if title.is_empty() || url.is_empty() {
        return None;
    }
    if body.chars().count() < MIN_BODY_CHARS {
        return None;
    }
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => return None,
    }

    Some(SearchResult::new(title, body, url, ordinal, stamp))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
