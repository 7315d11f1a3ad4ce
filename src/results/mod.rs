//! Result handling module
//!
//! Normalizes provider payloads and ranks them against the query.

mod parser;
mod scoring;
mod types;

pub use parser::{ResultParser, MIN_BODY_CHARS};
pub use scoring::{domain_matches, enhance, RelevanceScorer, MIN_RELEVANCE, REFERENCE_BODY_CHARS};
pub use types::{SearchResult, EMBEDDING_TEXT_CHARS};

pub(crate) use types::hex_digest;
