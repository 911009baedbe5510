// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Video listing.

use crate::error::{AppError, Result};
use crate::models::{DateFilter, Video, VideoSort};
use crate::services::VideoListing;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/videos", get(get_videos))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideosQuery {
    page: Option<u32>,
    page_size: Option<u32>,
    sort_by: Option<String>,
    date_filter: Option<String>,
    /// Comma-separated handles
    usernames: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VideoSummary {
    pub id: String,
    pub tiktok_id: String,
    /// Owning user's id
    pub author: String,
    pub created: String,
    pub desc: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub collected: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub comments: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub plays: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub shares: u64,
    pub cover: Option<String>,
    pub duration: Option<u32>,
    pub dynamic_cover: Option<String>,
}

impl From<Video> for VideoSummary {
    fn from(video: Video) -> Self {
        let r = video.record;
        Self {
            id: video.id,
            tiktok_id: r.tiktok_id,
            author: r.author,
            created: format_utc_rfc3339(r.created),
            desc: r.desc,
            collected: r.collected,
            comments: r.comments,
            plays: r.plays,
            shares: r.shares,
            cover: r.cover,
            duration: r.duration,
            dynamic_cover: r.dynamic_cover,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct VideosResponse {
    pub videos: Vec<VideoSummary>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_videos: u64,
}

fn parse_usernames(raw: Option<&str>) -> Option<Vec<String>> {
    let names: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    (!names.is_empty()).then_some(names)
}

/// List videos with sorting, a trailing date window and an owner filter.
async fn get_videos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VideosQuery>,
) -> Result<Json<VideosResponse>> {
    let sort = params
        .sort_by
        .as_deref()
        .map(str::parse::<VideoSort>)
        .transpose()
        .map_err(AppError::BadRequest)?
        .unwrap_or_default();
    let date_filter = params
        .date_filter
        .as_deref()
        .map(str::parse::<DateFilter>)
        .transpose()
        .map_err(AppError::BadRequest)?
        .unwrap_or_default();
    let usernames = parse_usernames(params.usernames.as_deref());

    tracing::debug!(
        page = ?params.page,
        page_size = ?params.page_size,
        sort = sort.field(),
        date_filter = %date_filter,
        usernames = ?usernames,
        "Listing videos"
    );

    let page = state
        .catalog
        .list_videos(VideoListing {
            page: params.page,
            page_size: params.page_size,
            sort,
            date_filter,
            usernames,
        })
        .await?;

    Ok(Json(VideosResponse {
        total_videos: page.total,
        videos: page.items.into_iter().map(VideoSummary::from).collect(),
    }))
}
