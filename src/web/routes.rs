//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Search routes
        .route("/search", get(handlers::search))
        .route("/search/batch", post(handlers::search_batch))
        // Diagnostics
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/metrics", get(handlers::metrics))
        // Add middleware
        .layer(CompressionLayer::new())
        .layer(cors)
        // Add state
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::engines::fake::ScriptedProvider;
    use crate::error::{ProviderErrorKind, SearchError};
    use crate::search::SearchManager;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(provider: ScriptedProvider) -> Router {
        let settings = Settings::default();
        let manager = SearchManager::new(&settings, Arc::new(provider));
        create_router(AppState::with_manager(settings, manager))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(ScriptedProvider::new()), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], crate::VERSION);
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let (status, body) = send(app(ScriptedProvider::new()), get("/search?q=budget")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "budget");
        assert_eq!(body["number_of_results"], 2);
        assert!(body["degraded"].is_null());
        assert!(body["results"][0]["relevance_score"].as_f64().unwrap() > 0.1);
    }

    #[tokio::test]
    async fn test_search_endpoint_reports_degradation() {
        let provider = ScriptedProvider::new().reply(Err(SearchError::Provider {
            kind: ProviderErrorKind::Auth,
            message: "bad key".to_string(),
        }));
        let (status, body) = send(app(provider), get("/search?q=budget")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["number_of_results"], 0);
        assert_eq!(body["degraded"]["reason"], "provider");
    }

    #[tokio::test]
    async fn test_batch_endpoint() {
        let request = Request::builder()
            .method("POST")
            .uri("/search/batch")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"queries": ["alpha", "beta", "alpha"], "max_concurrent": 2}).to_string(),
            ))
            .unwrap();
        let (status, body) = send(app(ScriptedProvider::new()), request).await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_object().unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.contains_key("alpha"));
        assert!(results.contains_key("beta"));
    }

    #[tokio::test]
    async fn test_status_unreachable() {
        let provider = ScriptedProvider::new().reply(Err(SearchError::Provider {
            kind: ProviderErrorKind::Auth,
            message: "bad key".to_string(),
        }));
        let (status, body) = send(app(provider), get("/status")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["reachable"], false);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (status, body) = send(app(ScriptedProvider::new()), get("/metrics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metrics"]["total_requests"], 0);
        assert_eq!(body["metrics"]["success_rate"], 0.0);
        assert_eq!(body["quota"]["daily_limit"], 1000);
        assert_eq!(body["cache_entries"], 0);
    }
}
