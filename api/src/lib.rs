//! HTTP surface of the carbon chat backend.

use std::{env, sync::Arc};

mod app_core;
mod error_handler;
mod middleware_layer;
mod routes;

pub use crate::app_core::app_state::{AppState, ConfigError};
pub use crate::error_handler::AppError;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::routes::{
    chat_route::chat,
    health_route::health,
    query_route::query,
    upload_route::{upload, upload_status},
};

const DEFAULT_ADDRESS: &str = "0.0.0.0:4000";

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Builds state from the environment and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env()?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "carbon chat API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Routes are served under `/api` (what the dashboard calls) and at the root.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = state
        .ingest
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let routes = Router::new()
        .route("/chat", post(chat))
        .route("/query", post(query))
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/upload/{id}/status", get(upload_status))
        .route("/health", get(health));

    Router::new()
        .nest("/api", routes.clone())
        .merge(routes)
        .layer(cors)
        .layer(middleware::from_fn(middleware_layer::request_id::request_id))
        .with_state(state)
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
