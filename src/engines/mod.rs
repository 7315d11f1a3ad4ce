//! Search provider module
//!
//! Defines the SearchProvider trait and the Tavily implementation.

mod traits;

pub mod tavily;

#[cfg(test)]
pub(crate) mod fake;

pub use tavily::Tavily;
pub use traits::*;
