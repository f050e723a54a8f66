use std::sync::Arc;

mod core {
    pub mod app_state;
    pub mod config;
    pub mod chat {
        pub mod chat_service;
        pub mod prompt;
    }
}
mod error_handler;
mod routes;

use axum::{Router, routing::get};
use conversation_store::spawn_sweeper;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use crate::core::{
    app_state::{AppState, SearchHandle},
    config::{ApiConfig, ContextPolicy},
};
pub use crate::error_handler::{AppError, AppResult};
use crate::routes::{ai::ai_route::ai_route, liveness_route::liveness};

/// Builds the HTTP router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/ai", get(ai_route))
        .with_state(state)
}

/// Loads configuration, starts the conversation sweeper and serves until Ctrl+C.
///
/// # Errors
/// Configuration errors (missing credentials, bad numbers) and bind/serve failures.
pub async fn start() -> Result<(), AppError> {
    let state = Arc::new(AppState::from_env()?);
    let shutdown = CancellationToken::new();

    let sweeper = spawn_sweeper(
        Arc::clone(&state.store),
        state.config.sweep_period,
        shutdown.clone(),
    );

    let listener = tokio::net::TcpListener::bind(&state.config.address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %state.config.address, "chat gateway listening");

    let served = axum::serve(listener, router(Arc::clone(&state)))
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await;

    // Stop the sweeper whether the server exited cleanly or not.
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        error!(error = %e, "conversation sweeper did not stop cleanly");
    }

    served.map_err(AppError::Server)?;
    info!("chat gateway stopped");
    Ok(())
}

/// Resolves on Ctrl+C or when `token` is cancelled elsewhere.
async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        res = signal::ctrl_c() => {
            if let Err(e) = res {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
        }
        _ = token.cancelled() => {}
    }
    info!("shutdown requested");
    token.cancel();
}
