use std::time::Duration;

use ai_llm_service::error_handler::{env_opt_u64, must_env};

use crate::errors::SearchError;

/// Google Custom Search settings.
///
/// # Env
/// - `GOOGLE_SEARCH_API_KEY` (required)
/// - `GOOGLE_SEARCH_ENGINE_ID` (required)
/// - `SEARCH_MAX_RESULTS` (optional, default 3, capped at 10 by the API)
/// - `SEARCH_TIMEOUT_SECS` (optional, default 10, must be positive)
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub engine_id: String,
    pub endpoint: String,
    pub max_results: usize,
    pub timeout: Duration,
}

impl SearchConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "https://www.googleapis.com/customsearch/v1";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn from_env() -> Result<Self, SearchError> {
        let timeout_secs = number("SEARCH_TIMEOUT_SECS")?.unwrap_or(Self::DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            api_key: required("GOOGLE_SEARCH_API_KEY")?,
            engine_id: required("GOOGLE_SEARCH_ENGINE_ID")?,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            max_results: number("SEARCH_MAX_RESULTS")?.unwrap_or(3).clamp(1, 10) as usize,
            timeout: request_timeout("SEARCH_TIMEOUT_SECS", timeout_secs)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, SearchError> {
    must_env(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| SearchError::MissingVar(name))
}

fn number(name: &'static str) -> Result<Option<u64>, SearchError> {
    env_opt_u64(name).map_err(|_| SearchError::InvalidNumber(name))
}

/// A zero timeout would fail every search immediately.
fn request_timeout(name: &'static str, secs: u64) -> Result<Duration, SearchError> {
    if secs == 0 {
        return Err(SearchError::InvalidNumber(name));
    }
    Ok(Duration::from_secs(secs))
}
