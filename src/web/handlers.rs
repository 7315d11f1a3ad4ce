//! HTTP request handlers

use super::state::AppState;
use crate::metrics::MetricsSnapshot;
use crate::quota::QuotaState;
use crate::results::SearchResult;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search query
    pub q: Option<String>,
}

/// Search results response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub number_of_results: usize,
    pub results: Vec<SearchResult>,
    /// Degradation label and message, when the search failed
    pub degraded: Option<DegradedInfo>,
}

#[derive(Debug, Serialize)]
pub struct DegradedInfo {
    pub reason: &'static str,
    pub message: String,
}

/// Batch search request body
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub queries: Vec<String>,
    pub max_concurrent: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: HashMap<String, Vec<SearchResult>>,
}

/// Metrics endpoint payload
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub metrics: MetricsSnapshot,
    pub quota: QuotaState,
    pub cache_entries: usize,
}

/// Search handler
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q.unwrap_or_default();
    let outcome = state.manager.search(&query).await;

    let degraded = outcome.degraded_reason().map(|err| DegradedInfo {
        reason: err.label(),
        message: err.to_string(),
    });
    let results = outcome.into_results();

    Json(SearchResponse {
        query: query.trim().to_string(),
        number_of_results: results.len(),
        results,
        degraded,
    })
    .into_response()
}

/// Batch search handler
pub async fn search_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> impl IntoResponse {
    let max_concurrent = request
        .max_concurrent
        .unwrap_or_else(|| state.batch_max_concurrent());
    let results = state
        .manager
        .search_batch(request.queries, max_concurrent)
        .await;

    Json(BatchResponse { results })
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

/// Provider status probe
pub async fn status(State(state): State<AppState>) -> Response {
    let status = state.manager.status().await;
    let code = if status.reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status)).into_response()
}

/// Metrics snapshot handler
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let manager = &state.manager;
    Json(MetricsResponse {
        metrics: manager.metrics().snapshot(),
        quota: manager.quota().snapshot(),
        cache_entries: manager.cache().map(|c| c.size()).unwrap_or(0),
    })
}
