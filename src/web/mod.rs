//! Web server module
//!
//! Provides the HTTP search API and diagnostics endpoints.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
