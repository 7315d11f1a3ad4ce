//! Relevance scoring and the result enhancement pipeline

use super::parser::MIN_BODY_CHARS;
use super::types::SearchResult;
use std::collections::HashSet;
use tracing::debug;

/// Results scoring below this are dropped
pub const MIN_RELEVANCE: f64 = 0.1;

/// Body length at which the length-quality term saturates
pub const REFERENCE_BODY_CHARS: usize = 500;

const TITLE_WEIGHT: f64 = 0.4;
const BODY_WEIGHT: f64 = 0.3;
const JACCARD_WEIGHT: f64 = 0.2;
const LENGTH_WEIGHT: f64 = 0.1;

/// Heuristic word-overlap scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceScorer;

impl RelevanceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score `result` against `query`, in [0, 1]
    pub fn score(&self, query: &str, result: &SearchResult) -> f64 {
        let query_tokens = tokenize(query);
        let title_tokens = tokenize(result.title());
        let body_tokens = tokenize(result.body());

        let title_overlap = overlap(&query_tokens, &title_tokens);
        let body_overlap = overlap(&query_tokens, &body_tokens);

        let doc_tokens: HashSet<&str> = title_tokens
            .union(&body_tokens)
            .map(String::as_str)
            .collect();
        let jaccard = jaccard(&query_tokens, &doc_tokens);

        let length_quality =
            (result.body().chars().count() as f64 / REFERENCE_BODY_CHARS as f64).min(1.0);

        let score = TITLE_WEIGHT * title_overlap
            + BODY_WEIGHT * body_overlap
            + JACCARD_WEIGHT * jaccard
            + LENGTH_WEIGHT * length_quality;

        score.clamp(0.0, 1.0)
    }
}

/// Lowercased whitespace tokens
fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// |query ∩ field| / |query|
fn overlap(query: &HashSet<String>, field: &HashSet<String>) -> f64 {
    if query.is_empty() {
        return 0.0;
    }
    query.intersection(field).count() as f64 / query.len() as f64
}

fn jaccard(query: &HashSet<String>, doc: &HashSet<&str>) -> f64 {
    let intersection = query.iter().filter(|t| doc.contains(t.as_str())).count();
    let union = query.len() + doc.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Dedupe, filter, score, rank and truncate parsed results
///
/// The output never repeats a URL or a body, and is sorted by descending score
/// with ties kept in input order.
pub fn enhance(
    query: &str,
    results: Vec<SearchResult>,
    max_results: usize,
    exclude_domains: &[String],
) -> Vec<SearchResult> {
    let scorer = RelevanceScorer::new();
    let input = results.len();

    let mut seen_urls = HashSet::new();
    let mut seen_bodies = HashSet::new();

    let mut ranked: Vec<SearchResult> = results
        .into_iter()
        .filter(|r| !r.title().trim().is_empty() && r.body().chars().count() >= MIN_BODY_CHARS)
        .filter(|r| !is_excluded(r, exclude_domains))
        // dropped results must not claim a URL or body ahead of a kept copy
        .filter(|r| seen_urls.insert(r.source_url().to_string()))
        .filter(|r| seen_bodies.insert(r.content_hash()))
        .map(|r| {
            let score = scorer.score(query, &r);
            r.with_relevance_score(score)
        })
        .filter(|r| r.relevance_score() >= MIN_RELEVANCE)
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.relevance_score().total_cmp(&a.relevance_score()));
    ranked.truncate(max_results);

    debug!("Enhanced {} results down to {}", input, ranked.len());
    ranked
}

fn is_excluded(result: &SearchResult, exclude_domains: &[String]) -> bool {
    if exclude_domains.is_empty() {
        return false;
    }
    match result.hostname() {
        Some(host) => exclude_domains.iter().any(|p| domain_matches(&host, p)),
        None => false,
    }
}

/// `*.go.kr` and `go.kr` both match `go.kr` and any subdomain of it
pub fn domain_matches(host: &str, pattern: &str) -> bool {
    let pattern = pattern.trim().trim_start_matches("*.").to_lowercase();
    if pattern.is_empty() {
        return false;
    }
    let host = host.to_lowercase();
    host == pattern || host.ends_with(&format!(".{}", pattern))
}
