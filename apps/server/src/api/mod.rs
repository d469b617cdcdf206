//! API layer - routes, handlers, and middleware

pub mod handlers;
pub mod middleware;
pub mod params;
pub mod routes;
pub mod views;

use crate::{request_context::RequestContext, state::AppState, Error};
use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::Uri,
    Router,
};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_request_body_size;
    let cors_origins = state.config.server.cors_origins.clone();

    Router::new()
        .nest("/api", routes::catalog_routes())
        .merge(routes::metrics_routes())
        .fallback(fallback)
        .with_state(state)
        // Applied in reverse order
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(axum::middleware::from_fn(middleware::metrics_middleware))
        .layer(middleware::compression())
        .layer(middleware::cors(&cors_origins))
        .layer(middleware::trace())
        .layer(DefaultBodyLimit::max(max_body_size))
}

async fn fallback(uri: Uri, ctx: Option<Extension<RequestContext>>) -> Error {
    let request_id = ctx.map(|Extension(ctx)| ctx.request_id).unwrap_or_default();
    tracing::debug!(request_id = %request_id, path = uri.path(), "No matching route");
    Error::NotFound(format!("No route for {}", uri.path()))
}
