//! HTTP-layer settings loaded from the environment.
//!
//! Provider credentials and the model ladder are read by
//! `ai_llm_service::config::default_config`; search credentials by
//! `web_search::SearchConfig`. This module covers the rest.

use std::{str::FromStr, time::Duration};

use ai_llm_service::error_handler::{env_bool, env_opt};
use conversation_store::DEFAULT_SWEEP_PERIOD;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid number in {0}")]
    InvalidNumber(&'static str),

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// What to do when a prompt carries both a conversation code and a search directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextPolicy {
    /// Search results replace the conversation context. The code is still
    /// reused to store the new answer.
    #[default]
    SearchWins,
    /// Both contexts are sent: conversation first, then search results.
    Combine,
}

impl FromStr for ContextPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search_wins" | "search" => Ok(ContextPolicy::SearchWins),
            "combine" | "both" => Ok(ContextPolicy::Combine),
            other => Err(ConfigError::InvalidValue {
                var: "CONTEXT_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

/// Settings for the `/ai` endpoint and process lifecycle.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address, e.g. `0.0.0.0:8080`.
    pub address: String,
    /// Name used in `"<persona> says, ..."`.
    pub persona: String,
    /// Length limit written into the instruction preamble.
    pub reply_max_chars: usize,
    pub context_policy: ContextPolicy,
    pub sweep_period: Duration,
    /// Whether `/search` directives are honoured (requires search credentials).
    pub search_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".into(),
            persona: "Gemini".into(),
            reply_max_chars: 500,
            context_policy: ContextPolicy::default(),
            sweep_period: DEFAULT_SWEEP_PERIOD,
            search_enabled: false,
        }
    }
}

impl ApiConfig {
    /// Reads `API_ADDRESS`, `PERSONA_NAME`, `REPLY_MAX_CHARS`, `CONTEXT_POLICY`,
    /// `SWEEP_INTERVAL_SECS` and `SEARCH_ENABLED`; unset values keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let reply_max_chars = match env_opt("REPLY_MAX_CHARS") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("REPLY_MAX_CHARS"))?,
            None => defaults.reply_max_chars,
        };
        let sweep_period = match env_opt("SWEEP_INTERVAL_SECS") {
            Some(v) => v
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidNumber("SWEEP_INTERVAL_SECS"))?,
            None => defaults.sweep_period,
        };
        let context_policy = match env_opt("CONTEXT_POLICY") {
            Some(v) => v.parse()?,
            None => defaults.context_policy,
        };

        Ok(Self {
            address: env_opt("API_ADDRESS").unwrap_or(defaults.address),
            persona: env_opt("PERSONA_NAME").unwrap_or(defaults.persona),
            reply_max_chars,
            context_policy,
            sweep_period,
            search_enabled: env_bool("SEARCH_ENABLED", defaults.search_enabled),
        })
    }
}
