//! Search outcome and probe models

use crate::error::SearchError;
use crate::results::SearchResult;
use serde::Serialize;

/// Result of a single search
///
/// Every failure past manager construction is reported as `Degraded` so
/// callers can continue with no external results.
#[derive(Debug, Clone)]
#[must_use]
pub enum SearchOutcome {
    /// Ranked results (possibly empty)
    Ok(Vec<SearchResult>),
    /// Recoverable failure; no results
    Degraded(SearchError),
}

impl SearchOutcome {
    /// Results, or an empty vector when degraded
    pub fn into_results(self) -> Vec<SearchResult> {
        match self {
            Self::Ok(results) => results,
            Self::Degraded(_) => Vec::new(),
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        match self {
            Self::Ok(results) => results,
            Self::Degraded(_) => &[],
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn degraded_reason(&self) -> Option<&SearchError> {
        match self {
            Self::Ok(_) => None,
            Self::Degraded(err) => Some(err),
        }
    }

    /// Convert into a `Result`, for callers that prefer `?`
    pub fn into_result(self) -> Result<Vec<SearchResult>, SearchError> {
        match self {
            Self::Ok(results) => Ok(results),
            Self::Degraded(err) => Err(err),
        }
    }
}

/// Outcome of a provider status probe
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: String,
    pub reachable: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
}
