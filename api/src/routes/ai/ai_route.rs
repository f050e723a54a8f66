//! GET /ai: one chat turn.

use std::sync::Arc;

use axum::extract::{Query, State};

use crate::{
    core::{app_state::AppState, chat::chat_service::chat},
    error_handler::AppResult,
    routes::ai::ai_request::AiQuery,
};

/// Handler: GET /ai
///
/// # Example
/// ```bash
/// curl 'http://127.0.0.1:8080/ai?prompt=hello'
/// # Gemini says, "Hi! How can I help?" #k2P
/// curl 'http://127.0.0.1:8080/ai?prompt=%23k2P%20tell%20me%20more'
/// ```
pub async fn ai_route(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AiQuery>,
) -> AppResult<String> {
    let raw = query.prompt.unwrap_or_default();
    let reply = chat(&state, &raw).await?;
    Ok(reply.format(&state.config.persona))
}
