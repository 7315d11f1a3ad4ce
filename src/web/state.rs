//! Application state shared across handlers

use crate::config::Settings;
use crate::search::SearchManager;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search manager
    pub manager: Arc<SearchManager>,
}

impl AppState {
    /// Create application state backed by Tavily
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let manager = SearchManager::from_settings(&settings)?;
        Ok(Self::with_manager(settings, manager))
    }

    /// Create application state around an existing manager
    pub fn with_manager(settings: Settings, manager: SearchManager) -> Self {
        Self {
            settings: Arc::new(settings),
            manager: Arc::new(manager),
        }
    }

    /// Default concurrency for batch requests
    pub fn batch_max_concurrent(&self) -> usize {
        self.settings.search.batch_max_concurrent
    }
}
