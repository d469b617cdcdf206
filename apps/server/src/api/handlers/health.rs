//! Liveness endpoint

use crate::{api::views::HealthView, state::AppState};
use axum::{extract::State, Json};

/// GET /api/health - reports liveness only; the store is not probed.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthView> {
    Json(HealthView {
        status: "ok",
        service: state.config.app_name.clone(),
    })
}
