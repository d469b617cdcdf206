//! Catalog endpoint handlers
//!
//! Each handler extracts validated parameters, calls the catalog service and
//! maps records to their external views. Errors flow back as `Error` and are
//! rendered by its `IntoResponse` impl.

use crate::{
    api::{
        params::{Path, ProcedureListParams, ProductListParams, ValidQuery},
        views::{Paginated, ProcedureCodeView, ProductView, StatsView},
    },
    db::Facet,
    state::AppState,
    Error, Result,
};
use axum::{extract::State, Json};

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ProductListParams>,
) -> Result<Json<Paginated<ProductView>>> {
    let page = state
        .catalog
        .query_products(&params.to_query(), params.page_request())
        .await?;
    Ok(Json(page.into()))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductView>> {
    let product = state.catalog.product(id).await?;
    Ok(Json(product.into()))
}

/// GET /api/tuss
pub async fn list_procedure_codes(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ProcedureListParams>,
) -> Result<Json<Paginated<ProcedureCodeView>>> {
    let page = state
        .catalog
        .query_procedure_codes(&params.to_query(), params.page_request())
        .await?;
    Ok(Json(page.into()))
}

/// GET /api/tuss/{code}
pub async fn get_procedure_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ProcedureCodeView>> {
    let procedure = state.catalog.procedure_code(&code).await?;
    Ok(Json(procedure.into()))
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsView>> {
    let stats = state.catalog.stats().await?;
    Ok(Json(stats.into()))
}

/// GET /api/filters/{facet}
pub async fn facet_values(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<String>>> {
    let facet = Facet::from_slug(&slug).ok_or_else(|| Error::not_found("Filter", &slug))?;
    let values = state.catalog.facet(facet).await?;
    Ok(Json(values))
}
