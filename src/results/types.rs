//! Result type definitions

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Maximum characters kept in [`SearchResult::embedding_text`]
pub const EMBEDDING_TEXT_CHARS: usize = 1000;

/// A single normalized search result
///
/// Results are immutable once built; the enhancement pipeline produces scored
/// copies through [`SearchResult::with_relevance_score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    id: String,
    title: String,
    body: String,
    source_url: String,
    embedding_text: String,
    relevance_score: f64,
}

impl SearchResult {
    /// Create an unscored result
    ///
    /// `ordinal` is the item position in the provider response and `stamp` the
    /// retrieval timestamp; together with the URL they derive the id.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        source_url: impl Into<String>,
        ordinal: usize,
        stamp: i64,
    ) -> Self {
        let title = title.into();
        let body = body.into();
        let source_url = source_url.into();

        let id = result_id(&source_url, ordinal, stamp);
        let embedding_text = truncate_chars(&format!("{}\n{}", title, body), EMBEDDING_TEXT_CHARS);

        Self {
            id,
            title,
            body,
            source_url,
            embedding_text,
            relevance_score: 0.0,
        }
    }

    /// Return a copy carrying the given score, clamped to [0, 1]
    pub fn with_relevance_score(mut self, score: f64) -> Self {
        self.relevance_score = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn embedding_text(&self) -> &str {
        &self.embedding_text
    }

    pub fn relevance_score(&self) -> f64 {
        self.relevance_score
    }

    /// Hash of the whitespace-normalized, lowercased body for duplicate detection
    pub fn content_hash(&self) -> String {
        let normalized = self
            .body
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        hex_digest(normalized.as_bytes())
    }

    /// Host of the source URL, if it parses
    pub fn hostname(&self) -> Option<String> {
        url::Url::parse(&self.source_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
    }
}

fn result_id(url: &str, ordinal: usize, stamp: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(ordinal.to_le_bytes());
    hasher.update(stamp.to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

pub(crate) fn hex_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
