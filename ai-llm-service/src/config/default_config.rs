//! Model tier configs loaded strictly from environment variables.
//!
//! Every tier of the fallback ladder shares the provider, endpoint, key and
//! limits; only the model identifier differs. The order of `LLM_MODELS` is the
//! order in which tiers are tried.
//!
//! # Environment variables
//!
//! - `LLM_PROVIDER`     = `gemini` (default) or `openai`
//! - `GEMINI_API_KEY` / `OPENAI_API_KEY` = API key for the selected provider (mandatory)
//! - `LLM_ENDPOINT`     = base URL override (optional)
//! - `LLM_MODELS`       = comma-separated ladder, best first (optional)
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = per-tier timeout, default 30, must be positive

use tracing::info;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_u32, env_opt_u64, must_env,
        validate_http_endpoint,
    },
};

/// Per-tier timeout when `LLM_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builds the ordered tier configs from the environment.
///
/// # Errors
///
/// - [`ConfigError::UnsupportedProvider`] if `LLM_PROVIDER` is unknown
/// - [`ConfigError::MissingVar`] if the provider's API key is missing
/// - [`ConfigError::InvalidNumber`] if a numeric variable does not parse
/// - [`ConfigError::InvalidFormat`] if `LLM_ENDPOINT` is not http(s)
pub fn config_tiers_from_env() -> Result<Vec<LlmModelConfig>, AiLlmError> {
    let provider = match env_opt("LLM_PROVIDER") {
        Some(raw) => raw.parse::<LlmProvider>()?,
        None => LlmProvider::Gemini,
    };
    let api_key = must_env(provider.api_key_var())?;
    let endpoint = env_opt("LLM_ENDPOINT");
    let models = env_opt("LLM_MODELS");
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let tiers = build_tiers(
        provider,
        endpoint.as_deref(),
        api_key,
        models.as_deref(),
        max_tokens,
        timeout_secs,
    )?;

    info!(
        provider = ?provider,
        tiers = ?tiers.iter().map(|t| t.model.as_str()).collect::<Vec<_>>(),
        timeout_secs,
        "model tiers configured"
    );

    Ok(tiers)
}

/// Expands one provider setup into one config per model, preserving order.
///
/// `models_csv = None` selects [`LlmProvider::default_models`]. Blank entries
/// are skipped; a list with no usable entries is [`ConfigError::EmptyModel`].
/// A zero `timeout_secs` is [`ConfigError::InvalidNumber`].
pub fn build_tiers(
    provider: LlmProvider,
    endpoint: Option<&str>,
    api_key: String,
    models_csv: Option<&str>,
    max_tokens: Option<u32>,
    timeout_secs: u64,
) -> Result<Vec<LlmModelConfig>, AiLlmError> {
    let endpoint = endpoint
        .unwrap_or(provider.default_endpoint())
        .trim_end_matches('/')
        .to_string();
    validate_http_endpoint("LLM_ENDPOINT", &endpoint)?;
    if timeout_secs == 0 {
        return Err(ConfigError::InvalidNumber {
            var: "LLM_TIMEOUT_SECS",
            reason: "must be greater than zero",
        }
        .into());
    }

    let models: Vec<String> = match models_csv {
        Some(csv) => csv
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
        None => provider
            .default_models()
            .iter()
            .map(|m| m.to_string())
            .collect(),
    };
    if models.is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    Ok(models
        .into_iter()
        .map(|model| LlmModelConfig {
            provider,
            model,
            endpoint: endpoint.clone(),
            api_key: Some(api_key.clone()),
            max_tokens,
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(timeout_secs),
        })
        .collect())
}
