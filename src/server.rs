//! Router assembly and the listening loop

use crate::api;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

#[must_use]
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_request_bytes();

    Router::new()
        .route("/", get(api::health_check))
        .route("/health", get(api::health_check))
        .route("/upload", get(api::upload_form))
        .route("/convert", post(api::convert_email))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let addr = state.config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("eml2pdf listening on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - POST /convert");
    tracing::info!("  - GET  /upload");
    tracing::info!("  - GET  /health (also /)");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
