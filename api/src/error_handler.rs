use ai_llm_service::error_handler::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;
use web_search::SearchError;

use crate::core::config::ConfigError;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    SearchConfig(SearchError),

    // --- IO / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("No prompt provided")]
    NoPrompt,

    #[error("No search query provided")]
    NoSearchQuery,

    // --- Upstream ---
    /// Generation failed: a non-quota tier error, a timeout, or every tier out of quota.
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::NoPrompt | AppError::NoSearchQuery => StatusCode::BAD_REQUEST,

            // upstream
            AppError::Search(_) => StatusCode::BAD_GATEWAY,

            // 5xx
            AppError::Config(_)
            | AppError::SearchConfig(_)
            | AppError::Bind(_)
            | AppError::Server(_)
            | AppError::Llm(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::SearchConfig(_) => "SEARCH_CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::NoPrompt => "NO_PROMPT",
            AppError::NoSearchQuery => "NO_SEARCH_QUERY",
            AppError::Llm(AiLlmError::AllModelsFailed { .. }) => "ALL_MODELS_FAILED",
            AppError::Llm(_) => "GENERATION_FAILED",
            AppError::Search(_) => "SEARCH_FAILED",
        }
    }
}

/// Errors are returned as a bare text body with a non-200 status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() || status == StatusCode::BAD_GATEWAY {
            warn!(code = self.error_code(), %status, error = %message, "request failed");
        }
        (status, message).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(AppError::NoPrompt.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Llm(AiLlmError::Timeout(Duration::from_secs(1))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Search(SearchError::Decode("x".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn all_models_failed_has_its_own_code() {
        let err = AppError::Llm(AiLlmError::AllModelsFailed {
            last: Box::new(AiLlmError::Timeout(Duration::from_secs(1))),
        });
        assert_eq!(err.error_code(), "ALL_MODELS_FAILED");
        assert!(err.to_string().contains("all models failed"));
    }
}
