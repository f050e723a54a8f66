use std::sync::Arc;

use ai_llm_service::{
    config::default_config::config_tiers_from_env, model_resolver::ModelResolver,
};
use conversation_store::ConversationStore;
use tracing::info;
use web_search::{GoogleSearchService, SearchConfig, WebSearch};

use crate::{core::config::ApiConfig, error_handler::AppError};

/// Web search handle plus how many hits to fold into the prompt.
#[derive(Clone)]
pub struct SearchHandle {
    pub backend: Arc<dyn WebSearch>,
    pub max_results: usize,
}

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    /// Per-code conversation memo; also owned by the sweeper task.
    pub store: Arc<ConversationStore>,
    /// Ordered model ladder.
    pub resolver: Arc<ModelResolver>,
    /// `None` when `SEARCH_ENABLED` is off; `/search` is then plain text.
    pub search: Option<SearchHandle>,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        store: Arc<ConversationStore>,
        resolver: Arc<ModelResolver>,
        search: Option<SearchHandle>,
    ) -> Self {
        Self {
            config,
            store,
            resolver,
            search,
        }
    }

    /// Load shared state from environment variables.
    ///
    /// Missing provider or (when search is enabled) search credentials are fatal.
    pub fn from_env() -> Result<Self, AppError> {
        let config = ApiConfig::from_env()?;
        let resolver = ModelResolver::from_configs(config_tiers_from_env()?)?;

        let search = if config.search_enabled {
            let cfg = SearchConfig::from_env().map_err(AppError::SearchConfig)?;
            let max_results = cfg.max_results;
            let backend = GoogleSearchService::new(cfg).map_err(AppError::SearchConfig)?;
            Some(SearchHandle {
                backend: Arc::new(backend),
                max_results,
            })
        } else {
            None
        };

        info!(
            tiers = resolver.tiers().len(),
            search_enabled = search.is_some(),
            context_policy = ?config.context_policy,
            "application state ready"
        );

        Ok(Self::new(
            config,
            Arc::new(ConversationStore::new()),
            Arc::new(resolver),
            search,
        ))
    }
}
