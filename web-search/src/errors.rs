//! Error type for the `web-search` crate.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Required environment variable is missing or empty.
    #[error("[Web Search] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A numeric variable failed to parse.
    #[error("[Web Search] invalid number in {0}")]
    InvalidNumber(&'static str),

    /// Client build or network failure.
    #[error("[Web Search] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The search API answered with a non-success status.
    #[error("[Web Search] HTTP {status}: {snippet}")]
    HttpStatus { status: StatusCode, snippet: String },

    /// Unexpected response payload.
    #[error("[Web Search] failed to decode response: {0}")]
    Decode(String),
}
