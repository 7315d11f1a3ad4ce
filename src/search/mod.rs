//! Search orchestration module
//!
//! Coordinates cache, quota, provider calls and ranking for single and
//! batched queries.

mod manager;
mod models;

pub use manager::{RetryPolicy, SearchManager};
pub use models::*;
