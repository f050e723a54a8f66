use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Represents the hosted provider (backend) used for text generation.
///
/// Parsed from `LLM_PROVIDER` (`gemini` | `openai`, case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API.
    Gemini,
    /// OpenAI chat completions API.
    OpenAI,
}

impl LlmProvider {
    /// Base URL used when `LLM_ENDPOINT` is not set.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
            LlmProvider::OpenAI => "https://api.openai.com",
        }
    }

    /// Fallback ladder used when `LLM_MODELS` is not set, best model first.
    pub fn default_models(self) -> &'static [&'static str] {
        match self {
            LlmProvider::Gemini => &["gemini-1.5-pro", "gemini-1.5-flash", "gemini-1.0-pro"],
            LlmProvider::OpenAI => &["gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo"],
        }
    }

    /// Environment variable that carries the API key for this provider.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
