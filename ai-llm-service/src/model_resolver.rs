//! Ordered model fallback.
//!
//! A [`ModelResolver`] owns a ladder of [`ModelTier`]s and tries them in rank
//! order:
//! - success → return immediately, later tiers are never called;
//! - quota exhausted → move on to the next tier;
//! - anything else (including a timeout) → fail with that tier's error.
//!
//! When every tier is out of quota the result is
//! [`AiLlmError::AllModelsFailed`] carrying the last tier's error.
//!
//! # Example
//! ```no_run
//! use ai_llm_service::config::default_config::config_tiers_from_env;
//! use ai_llm_service::model_resolver::ModelResolver;
//!
//! # async fn run() -> Result<(), ai_llm_service::error_handler::AiLlmError> {
//! let resolver = ModelResolver::from_configs(config_tiers_from_env()?)?;
//! let out = resolver.generate("Say hi").await?;
//! println!("{} answered: {}", out.model, out.text);
//! # Ok(()) }
//! ```

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{info, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError},
    generator::TextGenerator,
    services::{gemini_service::GeminiService, open_ai_service::OpenAiService},
};

/// One rung of the fallback ladder.
#[derive(Clone)]
pub struct ModelTier {
    /// Position in the ordering; lower is tried first.
    pub rank: usize,
    backend: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl ModelTier {
    pub fn new(rank: usize, backend: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            rank,
            backend,
            timeout,
        }
    }

    /// External model identifier.
    pub fn identifier(&self) -> &str {
        self.backend.model()
    }
}

impl std::fmt::Debug for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelTier")
            .field("rank", &self.rank)
            .field("identifier", &self.identifier())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Text produced by the first tier that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    /// Identifier of the tier that produced `text`.
    pub model: String,
}

/// Ordered list of tiers plus the loop that walks it.
#[derive(Debug, Clone)]
pub struct ModelResolver {
    tiers: Vec<ModelTier>,
}

impl ModelResolver {
    /// Creates a resolver; tiers are sorted by `rank`.
    ///
    /// # Errors
    /// [`ConfigError::NoModelTiers`] if `tiers` is empty.
    pub fn new(mut tiers: Vec<ModelTier>) -> Result<Self, AiLlmError> {
        if tiers.is_empty() {
            return Err(ConfigError::NoModelTiers.into());
        }
        tiers.sort_by_key(|t| t.rank);
        Ok(Self { tiers })
    }

    /// Builds one provider client per config; config order becomes rank order.
    pub fn from_configs(configs: Vec<LlmModelConfig>) -> Result<Self, AiLlmError> {
        let tiers = configs
            .into_iter()
            .enumerate()
            .map(|(rank, cfg)| -> Result<ModelTier, AiLlmError> {
                let timeout = Duration::from_secs(
                    cfg.timeout_secs
                        .unwrap_or(crate::config::default_config::DEFAULT_TIMEOUT_SECS),
                );
                let backend: Arc<dyn TextGenerator> = match cfg.provider {
                    LlmProvider::Gemini => Arc::new(GeminiService::new(cfg)?),
                    LlmProvider::OpenAI => Arc::new(OpenAiService::new(cfg)?),
                };
                Ok(ModelTier::new(rank, backend, timeout))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tiers)
    }

    pub fn tiers(&self) -> &[ModelTier] {
        &self.tiers
    }

    /// Runs `prompt` through the ladder.
    ///
    /// # Errors
    /// - the first non-quota error encountered, unchanged
    /// - [`AiLlmError::AllModelsFailed`] when every tier ran out of quota
    pub async fn generate(&self, prompt: &str) -> Result<Generation, AiLlmError> {
        let mut last_err = None;

        for tier in &self.tiers {
            let started = Instant::now();
            let attempt = tokio::time::timeout(tier.timeout, tier.backend.generate(prompt)).await;
            let result = attempt.unwrap_or_else(|_| Err(AiLlmError::Timeout(tier.timeout)));

            match result {
                Ok(text) => {
                    info!(
                        model = tier.identifier(),
                        rank = tier.rank,
                        latency_ms = started.elapsed().as_millis(),
                        "model tier succeeded"
                    );
                    return Ok(Generation {
                        text,
                        model: tier.identifier().to_string(),
                    });
                }
                Err(err) if err.is_quota_exhausted() => {
                    warn!(
                        model = tier.identifier(),
                        rank = tier.rank,
                        error = %err,
                        "model tier out of quota; trying next"
                    );
                    last_err = Some(err);
                }
                Err(err) => {
                    warn!(
                        model = tier.identifier(),
                        rank = tier.rank,
                        error = %err,
                        "model tier failed"
                    );
                    return Err(err);
                }
            }
        }

        // `new` guarantees at least one tier, so the loop ran and set `last_err`.
        match last_err {
            Some(last) => Err(AiLlmError::AllModelsFailed {
                last: Box::new(last),
            }),
            None => Err(ConfigError::NoModelTiers.into()),
        }
    }
}
