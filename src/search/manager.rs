//! Search orchestration: cache, quota, provider call, parsing and ranking

use super::models::{ProviderStatus, SearchOutcome};
use crate::cache::{normalize_query, ResultCache};
use crate::config::{SearchSettings, Settings};
use crate::engines::{ProviderRequest, SearchProvider, Tavily};
use crate::error::SearchError;
use crate::metrics::MetricsCollector;
use crate::quota::QuotaTracker;
use crate::results::{enhance, ResultParser, SearchResult};
use futures::future::join_all;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

/// Query used by the provider status probe
const PROBE_QUERY: &str = "health check";

/// Backoff between retries of retryable provider failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// No retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// `base * 2^attempt` plus up to 25% jitter
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        let max_jitter = u64::try_from(backoff.as_millis() / 4).unwrap_or(u64::MAX);
        let jitter = rand::thread_rng().gen_range(0..=max_jitter);
        backoff + Duration::from_millis(jitter)
    }
}

impl From<&SearchSettings> for RetryPolicy {
    fn from(settings: &SearchSettings) -> Self {
        Self::new(settings.max_retries, settings.retry_base_delay())
    }
}

/// Search manager owning the cache, quota and metrics for one provider
pub struct SearchManager {
    provider: Arc<dyn SearchProvider>,
    settings: SearchSettings,
    cache: Option<Arc<ResultCache>>,
    quota: Arc<QuotaTracker>,
    metrics: Arc<MetricsCollector>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl SearchManager {
    /// Build a manager backed by Tavily
    ///
    /// Fails with [`SearchError::Configuration`] when the settings are invalid
    /// or no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, SearchError> {
        settings.validate()?;
        let tavily = Tavily::new(&settings.search)?;
        info!("Tavily client initialized ({})", tavily.endpoint());
        Ok(Self::new(settings, Arc::new(tavily)))
    }

    /// Build a manager around any provider
    pub fn new(settings: &Settings, provider: Arc<dyn SearchProvider>) -> Self {
        let cache = settings
            .cache
            .enabled
            .then(|| Arc::new(ResultCache::new(settings.cache.ttl, settings.cache.max_entries)));

        Self {
            provider,
            settings: settings.search.clone(),
            cache,
            quota: Arc::new(QuotaTracker::new(settings.search.daily_quota)),
            metrics: Arc::new(MetricsCollector::new()),
            timeout: settings.search.timeout_duration(),
            retry: RetryPolicy::from(&settings.search),
        }
    }

    /// Replace the quota tracker
    pub fn with_quota(mut self, quota: QuotaTracker) -> Self {
        self.quota = Arc::new(quota);
        self
    }

    /// Replace the cache; `None` disables caching
    pub fn with_cache(mut self, cache: Option<ResultCache>) -> Self {
        self.cache = cache.map(Arc::new);
        self
    }

    /// Set the per-call provider timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> Option<&Arc<ResultCache>> {
        self.cache.as_ref()
    }

    pub fn quota(&self) -> &Arc<QuotaTracker> {
        &self.quota
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Search a single query
    ///
    /// Steps run in order: cache check, quota check, provider call, parse,
    /// enhance, cache write. Blank queries return no results and consume no
    /// quota.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Ok(Vec::new());
        }

        self.metrics.record_request();

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(query) {
                debug!("Cache hit for '{}' ({} results)", query, cached.len());
                self.metrics.record_cache_hit();
                self.metrics.record_success();
                return SearchOutcome::Ok(cached);
            }
            self.metrics.record_cache_miss();
        }

        match self.fetch(query).await {
            Ok(results) => {
                if let Some(cache) = &self.cache {
                    cache.set(query, results.clone());
                }
                self.metrics.record_success();
                debug!("Search '{}' returned {} results", query, results.len());
                SearchOutcome::Ok(results)
            }
            Err(err) => {
                if err.is_timeout() {
                    self.metrics.record_timeout();
                } else {
                    self.metrics.record_failure();
                }
                report(query, &err);
                SearchOutcome::Degraded(err)
            }
        }
    }

    /// Search many queries with at most `max_concurrent` in flight
    ///
    /// Queries that differ only in case or surrounding whitespace are
    /// dispatched once, and each spelling is a key of the result. A failed query maps to an empty
    /// vector without affecting the others.
    pub async fn search_batch<I, S>(
        &self,
        queries: I,
        max_concurrent: usize,
    ) -> HashMap<String, Vec<SearchResult>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // Queries sharing a cache key run once; every spelling gets the results
        let mut groups: Vec<Vec<String>> = Vec::new();
        let mut by_key: HashMap<String, usize> = HashMap::new();
        for query in queries.into_iter().map(Into::into) {
            match by_key.get(&normalize_query(&query)) {
                Some(&i) => {
                    if !groups[i].contains(&query) {
                        groups[i].push(query);
                    }
                }
                None => {
                    by_key.insert(normalize_query(&query), groups.len());
                    groups.push(vec![query]);
                }
            }
        }

        let limit = max_concurrent.max(1);
        let semaphore = Semaphore::new(limit);
        info!(
            "Executing batch of {} queries, at most {} concurrent",
            groups.len(),
            limit
        );

        let tasks = groups.into_iter().map(|spellings| {
            let semaphore = &semaphore;
            async move {
                let query = &spellings[0];
                let outcome = match semaphore.acquire().await {
                    Ok(_permit) => self.search(query).await,
                    Err(_) => SearchOutcome::Degraded(SearchError::provider("batch gate closed")),
                };
                if let Some(err) = outcome.degraded_reason() {
                    warn!("Batch query '{}' degraded: {}", query, err);
                }
                (spellings, outcome.into_results())
            }
        });

        join_all(tasks)
            .await
            .into_iter()
            .flat_map(|(spellings, results)| {
                spellings
                    .into_iter()
                    .map(move |query| (query, results.clone()))
            })
            .collect()
    }

    /// Probe the provider with a trivial search, bypassing the cache
    pub async fn status(&self) -> ProviderStatus {
        let request = ProviderRequest::from_settings(PROBE_QUERY, &self.settings).with_max_results(1);
        let started = Instant::now();
        let result = self.call_provider(&request).await;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        ProviderStatus {
            provider: self.provider.name().to_string(),
            reachable: result.is_ok(),
            latency_ms,
            error: result.err().map(|e| e.to_string()),
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let request = ProviderRequest::from_settings(query, &self.settings);
        let raw = self.call_provider(&request).await?;
        let parsed = ResultParser::now().parse(&raw)?;

        Ok(enhance(
            query,
            parsed,
            self.settings.max_results,
            &self.settings.exclude_domains,
        ))
    }

    /// Quota-gated, time-bounded provider call with retries
    ///
    /// Every attempt consumes one quota unit, whatever its outcome.
    async fn call_provider(&self, request: &ProviderRequest) -> Result<serde_json::Value, SearchError> {
        let mut attempt = 0;
        loop {
            if !self.quota.try_acquire() {
                return Err(SearchError::QuotaExceeded {
                    limit: self.quota.daily_limit(),
                });
            }

            let started = Instant::now();
            let result = timeout(self.timeout, self.provider.search(request)).await;
            self.metrics.record_response_time(started.elapsed());

            match result {
                Err(_) => return Err(SearchError::Timeout(self.timeout)),
                Ok(Ok(raw)) => return Ok(raw),
                Ok(Err(err)) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Provider call for '{}' failed ({}), retrying in {:?}",
                        request.query, err, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Ok(Err(err)) => return Err(err),
            }
        }
    }
}

fn report(query: &str, err: &SearchError) {
    if err.is_quota_exhausted() {
        error!(target: "pai_search::alert", "Search quota exhausted, '{}' skipped: {}", query, err);
        return;
    }
    match err {
        SearchError::Timeout(limit) => {
            warn!("Search '{}' timed out after {:?}", query, limit)
        }
        SearchError::Parsing { message, raw } => {
            error!("Unparseable provider payload for '{}': {}; raw payload: {}", query, message, raw)
        }
        SearchError::QuotaExceeded { .. } | SearchError::Provider { .. } | SearchError::Configuration(_) => {
            error!("Search '{}' failed: {}", query, err)
        }
    }
}
