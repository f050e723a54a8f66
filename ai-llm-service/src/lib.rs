//! Hosted LLM access for the chat gateway: provider configs, Gemini/OpenAI
//! clients behind the [`generator::TextGenerator`] trait, a unified error
//! taxonomy, and the ordered [`model_resolver::ModelResolver`].

pub mod config {
    pub mod default_config;
    pub mod llm_model_config;
    pub mod llm_provider;
}

pub mod services {
    pub mod gemini_service;
    pub mod open_ai_service;
}

pub mod error_handler;
pub mod generator;
pub mod model_resolver;
pub mod telemetry;
