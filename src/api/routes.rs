//! Route assembly

use super::handlers::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/v1/query", post(handlers::resolve_query))
        .route("/api/v1/ingest", post(handlers::ingest_pairs))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::export_metrics))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
