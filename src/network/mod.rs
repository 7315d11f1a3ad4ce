//! HTTP networking module
//!
//! Provides HTTP client functionality for calling the search provider.

mod client;

pub use client::HttpClient;
