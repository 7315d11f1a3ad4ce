//! Metrics collection module
//!
//! Tracks search outcomes, cache efficiency and provider response times.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// Number of response-time samples retained
pub const RESPONSE_WINDOW: usize = 1000;

/// Search metrics collector
#[derive(Debug)]
pub struct MetricsCollector {
    /// Non-empty searches requested
    total_requests: AtomicU64,
    /// Searches answered without degrading (cache hits included)
    successful_requests: AtomicU64,
    /// Degraded searches
    failed_requests: AtomicU64,
    /// Degraded searches caused by a provider timeout
    timeouts: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    /// Last provider response times in ms
    response_times: RwLock<VecDeque<u64>>,
}

impl MetricsCollector {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            response_times: RwLock::new(VecDeque::with_capacity(RESPONSE_WINDOW)),
        }
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failure caused by a timeout
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
        self.record_failure();
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a provider response time
    pub fn record_response_time(&self, elapsed: Duration) {
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let mut times = self
            .response_times
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if times.len() >= RESPONSE_WINDOW {
            times.pop_front();
        }
        times.push_back(ms);
    }

    /// Snapshot of all counters and derived rates
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_requests.load(Ordering::Relaxed);
        let success = self.successful_requests.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);

        let times = self
            .response_times
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let samples = times.len();
        let (avg, min, max) = if samples == 0 {
            (0.0, 0, 0)
        } else {
            let sum: u64 = times.iter().sum();
            (
                sum as f64 / samples as f64,
                times.iter().copied().min().unwrap_or(0),
                times.iter().copied().max().unwrap_or(0),
            )
        };

        MetricsSnapshot {
            total_requests: total,
            successful_requests: success,
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            cache_hits: hits,
            cache_misses: misses,
            success_rate: ratio(success, total),
            cache_hit_rate: ratio(hits, hits + misses),
            avg_response_ms: avg,
            min_response_ms: min,
            max_response_ms: max,
            response_samples: samples,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Point-in-time metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub timeouts: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub success_rate: f64,
    pub cache_hit_rate: f64,
    pub avg_response_ms: f64,
    pub min_response_ms: u64,
    pub max_response_ms: u64,
    pub response_samples: usize,
}
