// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Creator listing and lookup.

use crate::error::{AppError, Result};
use crate::models::{User, UserSort};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/users", get(get_users))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsersQuery {
    page: Option<u32>,
    page_size: Option<u32>,
    sort_by: Option<String>,
    /// Single-user lookup by handle; overrides the listing parameters
    unique_id: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSummary {
    pub id: String,
    pub unique_id: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub followers: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub following: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub hearts: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub videos: u64,
    pub last_media_updated: Option<String>,
    pub last_video_activity: Option<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            unique_id: user.unique_id,
            nickname: user.nickname,
            avatar: user.avatar,
            followers: user.followers,
            following: user.following,
            hearts: user.hearts,
            videos: user.videos,
            last_media_updated: user.last_media_updated.map(format_utc_rfc3339),
            last_video_activity: user.last_video_activity.map(format_utc_rfc3339),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub user: UserSummary,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_users: u64,
}

/// List creators, or look one up with `uniqueId`.
async fn get_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UsersQuery>,
) -> Result<Response> {
    if let Some(unique_id) = params.unique_id.filter(|id| !id.is_empty()) {
        tracing::debug!(unique_id = %unique_id, "Fetching user");
        let user = state.catalog.get_user(&unique_id).await?;
        return Ok(Json(UserResponse { user: user.into() }).into_response());
    }

    let sort = params
        .sort_by
        .as_deref()
        .map(str::parse::<UserSort>)
        .transpose()
        .map_err(AppError::BadRequest)?
        .unwrap_or_default();

    tracing::debug!(page = ?params.page, page_size = ?params.page_size, sort = sort.field(), "Listing users");

    let page = state
        .catalog
        .list_users(params.page, params.page_size, sort)
        .await?;

    Ok(Json(UsersResponse {
        total_users: page.total,
        users: page.items.into_iter().map(UserSummary::from).collect(),
    })
    .into_response())
}
