//! Caching module for pai-search
//!
//! Bounded, TTL-based store of ranked results keyed by normalized query.

use crate::results::{hex_digest, SearchResult};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<SearchResult>,
    written_at: Instant,
}

/// Cache for search results
///
/// Expired entries are removed lazily on read. When full, inserting a new key
/// evicts the entry with the oldest write time; reads do not refresh entries.
#[derive(Debug)]
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl ResultCache {
    /// Create a new result cache with specified TTL and entry ceiling
    pub fn new(ttl_seconds: u64, max_entries: usize) -> Self {
        Self::with_ttl(Duration::from_secs(ttl_seconds), max_entries)
    }

    pub fn with_ttl(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Get cached results for a query
    pub fn get(&self, query: &str) -> Option<Vec<SearchResult>> {
        self.get_at(query, Instant::now())
    }

    /// Store results for a query
    pub fn set(&self, query: &str, results: Vec<SearchResult>) {
        self.set_at(query, results, Instant::now());
    }

    pub(crate) fn get_at(&self, query: &str, now: Instant) -> Option<Vec<SearchResult>> {
        let key = query_cache_key(query);

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&key) {
                None => return None,
                Some(entry) if !self.is_expired(entry, now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Expired: re-check under the write lock, a writer may have refreshed it
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&key) {
            Some(entry) if !self.is_expired(entry, now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(&key);
                debug!("Cache entry for '{}' expired", query);
                None
            }
            None => None,
        }
    }

    pub(crate) fn set_at(&self, query: &str, results: Vec<SearchResult>, now: Instant) {
        let key = query_cache_key(query);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.written_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                debug!("Cache full, evicted oldest entry");
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value: results,
                written_at: now,
            },
        );
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.written_at) >= self.ttl
    }

    /// Remove a cached query
    pub fn remove(&self, query: &str) {
        let key = query_cache_key(query);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get cache size, including expired entries not yet read
    pub fn size(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(3600, 1000) // 1 hour TTL, 1k max entries
    }
}

/// Lowercase and trim a query for cache lookups
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Generate a cache key for a search query
pub fn query_cache_key(query: &str) -> String {
    hex_digest(normalize_query(query).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(url: &str) -> Vec<SearchResult> {
        vec![SearchResult::new("title", "some body text", url, 0, 0)]
    }

    #[test]
    fn test_result_cache() {
        let cache = ResultCache::new(60, 100);
        cache.set("test", results("https://a.go.kr/1"));

        let result = cache.get("test");
        assert!(result.is_some());
        assert_eq!(result.unwrap(), results("https://a.go.kr/1"));
    }

    #[test]
    fn test_key_is_normalized() {
        let cache = ResultCache::new(60, 100);
        cache.set("  Pohang Population ", results("https://a.go.kr/1"));
        assert!(cache.get("pohang population").is_some());
        assert_eq!(query_cache_key("ABC "), query_cache_key("abc"));
        assert_eq!(query_cache_key("abc").len(), 64);
    }

    #[test]
    fn test_entry_at_ttl_boundary_is_expired() {
        let cache = ResultCache::new(10, 100);
        let t0 = Instant::now();
        cache.set_at("q", results("https://a.go.kr/1"), t0);

        assert!(cache
            .get_at("q", t0 + Duration::from_secs(10) - Duration::from_millis(1))
            .is_some());
        assert!(cache.get_at("q", t0 + Duration::from_secs(10)).is_none());
        // expired entries are deleted on read
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache = ResultCache::with_ttl(Duration::ZERO, 10);
        cache.set("q", results("https://a.go.kr/1"));
        assert!(cache.get("q").is_none());
    }

    #[test]
    fn test_evicts_oldest_write() {
        let cache = ResultCache::new(3600, 2);
        let t0 = Instant::now();
        cache.set_at("first", results("https://a.go.kr/1"), t0);
        cache.set_at("second", results("https://a.go.kr/2"), t0 + Duration::from_secs(1));

        // reading does not protect "first"
        assert!(cache.get_at("first", t0 + Duration::from_secs(2)).is_some());

        cache.set_at("third", results("https://a.go.kr/3"), t0 + Duration::from_secs(3));
        let now = t0 + Duration::from_secs(4);
        assert!(cache.get_at("first", now).is_none());
        assert!(cache.get_at("second", now).is_some());
        assert!(cache.get_at("third", now).is_some());
        assert_eq!(cache.size(), 2);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = ResultCache::new(3600, 2);
        cache.set("a", results("https://a.go.kr/1"));
        cache.set("b", results("https://a.go.kr/2"));
        cache.set("a", results("https://a.go.kr/3"));

        assert_eq!(cache.size(), 2);
        assert_eq!(cache.get("a").unwrap()[0].source_url(), "https://a.go.kr/3");
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = ResultCache::default();
        cache.set("a", results("https://a.go.kr/1"));
        cache.set("b", results("https://a.go.kr/2"));
        cache.remove("a");
        assert!(cache.get("a").is_none());
        cache.clear();
        assert_eq!(cache.size(), 0);
    }
}
