//! Capability boundary for text generation.
//!
//! Everything above this trait (the resolver, the HTTP layer) only sees
//! `prompt -> text` and a typed [`AiLlmError`]. Provider clients implement it;
//! tests substitute fakes.

use async_trait::async_trait;

use crate::error_handler::AiLlmError;

/// A single hosted model that can turn a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// External model identifier (e.g., `gemini-1.5-pro`).
    fn model(&self) -> &str;

    /// Generates a completion for `prompt`.
    ///
    /// # Errors
    /// Quota exhaustion must surface as
    /// [`ProviderErrorKind::QuotaExhausted`](crate::error_handler::ProviderErrorKind::QuotaExhausted)
    /// so the resolver can fall back.
    async fn generate(&self, prompt: &str) -> Result<String, AiLlmError>;
}
