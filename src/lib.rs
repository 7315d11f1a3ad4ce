//! pai-search: cached, quota-gated web search for the public-institution QA agents
//!
//! Wraps the Tavily search API with result parsing, relevance ranking, a TTL
//! cache, a daily call quota and metrics. Every failure past construction
//! degrades to an empty result set so the calling agent can carry on.

pub mod cache;
pub mod config;
pub mod engines;
pub mod error;
pub mod metrics;
pub mod network;
pub mod quota;
pub mod results;
pub mod search;
pub mod web;

pub use config::Settings;
pub use error::SearchError;
pub use results::SearchResult;
pub use search::{SearchManager, SearchOutcome};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
