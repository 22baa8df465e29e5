//! HTTP routing and request handling

pub mod extract;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use orchestrator::PromptStore;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the API router over `state`
pub fn router<S>(state: AppState<S>) -> Router
where
    S: PromptStore + 'static,
{
    Router::new()
        .route("/api/optimize", post(handlers::api::optimize::<S>))
        .route("/api/ratings", post(handlers::api::rate::<S>))
        .route("/api/history", get(handlers::api::history::<S>))
        .route("/api/strategies", get(handlers::api::strategies))
        .route("/health", get(handlers::health::health::<S>))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
