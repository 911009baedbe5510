//! Aggregate growth statistics.

use crate::error::Result;
use crate::services::StatsSummary;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/stats", get(get_stats))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsSummary>> {
    Ok(Json(state.catalog.stats().await?))
}
