//! pai-search: cached, quota-gated web search service
//!
//! This is the main entry point for the application.

use anyhow::Result;
use pai_search::{
    config,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "-V" | "--version" => {
                println!("pai-search {}", pai_search::VERSION);
                return Ok(());
            }
            _ => {}
        }
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting pai-search v{}", pai_search::VERSION);

    // Load configuration
    let settings = config::load()?;
    info!(
        "Search depth {}, max {} results, cache {}",
        settings.search.search_depth,
        settings.search.max_results,
        if settings.cache.enabled { "on" } else { "off" }
    );

    // Create application state (fails fast without an API key)
    let state = AppState::new(settings.clone())?;
    info!("Search manager initialized");

    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
pai-search v{}
Cached, quota-gated Tavily web search service

USAGE:
    pai-search [OPTIONS]

OPTIONS:
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    PAI_SEARCH_SETTINGS_PATH  Path to settings.yml
    PAI_SEARCH_PORT           Server port
    PAI_SEARCH_BIND_ADDRESS   Bind address
    TAVILY_API_KEY            Tavily API key (required)
    TAVILY_MAX_RESULTS        Results per query (default 5)
    TAVILY_SEARCH_DEPTH       basic | advanced (default advanced)
    TAVILY_TIMEOUT            Provider timeout in seconds (default 30)
    TAVILY_CACHE_ENABLED      Enable result cache (default true)
    TAVILY_CACHE_TTL          Cache TTL in seconds (default 3600)
    RUST_LOG                  Log filter (default info)
"#,
        pai_search::VERSION
    );
}
