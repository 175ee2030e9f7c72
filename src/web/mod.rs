//! Browser-facing presentation shell

mod api;
mod handlers;
pub mod page;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::planner::TripPlanner;

pub use api::{ApiPlan, ApiReport};

/// `/download` accepts whole itineraries, so allow a few megabytes
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TripPlanner>,
}

pub fn router(planner: Arc<TripPlanner>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/plan", post(handlers::plan))
        .route("/download", post(handlers::download))
        .route("/health", get(handlers::health))
        .nest("/api", api::router())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { planner })
}

pub async fn run(config: &ServerConfig, planner: TripPlanner) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind web server to {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, router(Arc::new(planner)))
        .await
        .context("Web server stopped unexpectedly")?;
    Ok(())
}
