//! Catalog API routes, mounted under `/api`

use crate::api::handlers::{catalog, health};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/products", get(catalog::list_products))
        .route("/products/:id", get(catalog::get_product))
        .route("/tuss", get(catalog::list_procedure_codes))
        .route("/tuss/:code", get(catalog::get_procedure_code))
        .route("/stats", get(catalog::stats))
        .route("/filters/:facet", get(catalog::facet_values))
}
