pub mod cors;
pub mod handlers;
mod types;

pub use types::*;

use crate::{Result, config::Config, llm::HuggingFaceClient};
use axum::{Router, middleware, routing::any};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Mounts the chat handler on `path`. Every method is routed to the handler
/// so rejections carry the same headers as successes.
pub fn router(state: AppState, path: &str) -> Router {
    Router::new()
        .route(path, any(handlers::chat))
        .layer(middleware::map_response(cors::with_cors_headers))
        // Failures are logged once by the handler itself
        .layer(TraceLayer::new_for_http().on_failure(()))
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let backend = Arc::new(HuggingFaceClient::new(config.inference.clone()));
    let state = AppState::new(backend).with_max_body_bytes(config.server.max_body_bytes);
    let app = router(state, &config.server.path);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}{}", addr, config.server.path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
