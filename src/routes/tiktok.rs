// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Manual sync trigger.

use crate::error::AppError;
use crate::middleware::require_trigger_token;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const UPDATE_SUCCESS_MESSAGE: &str = "TikTok videos updated successfully";
pub const UPDATE_FAILURE_MESSAGE: &str = "An error occurred while updating TikTok videos";

pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tiktok/updateMedia", post(update_media))
        .route_layer(middleware::from_fn_with_state(state, require_trigger_token))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpdateMediaResponse {
    pub msg: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpdateMediaError {
    pub error: String,
}

/// Run a full sync pass and report success or a generic failure.
async fn update_media(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!("Sync triggered via API");

    match state.sync.sync_all().await {
        Ok(report) => {
            tracing::info!(
                users_updated = report.users_updated,
                videos_written = report.videos_written,
                "Triggered sync finished"
            );
            Json(UpdateMediaResponse {
                msg: UPDATE_SUCCESS_MESSAGE.to_string(),
            })
            .into_response()
        }
        Err(AppError::Conflict(reason)) => {
            tracing::warn!(reason = %reason, "Rejected overlapping sync trigger");
            (StatusCode::CONFLICT, Json(UpdateMediaError { error: reason })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Triggered sync failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UpdateMediaError {
                    error: UPDATE_FAILURE_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
    }
}
