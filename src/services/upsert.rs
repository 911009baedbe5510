// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Writes fetched video items into `tiktok_videos`, keyed by TikTok id.

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::VideoRecord;
use crate::services::tiktok::{TikTokVideo, VideoPayload};
use chrono::DateTime;
use serde_json::Value;
use std::sync::Arc;

/// Counts from applying one payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    /// Items inserted or updated
    pub written: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Items that were malformed or whose write failed
    pub failed: usize,
}

impl UpsertSummary {
    /// Merge counts from another page.
    pub fn add(&mut self, other: UpsertSummary) {
        self.written += other.written;
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Convert one provider item into the stored record shape.
pub fn normalize(item: &Value, author: &str) -> Result<VideoRecord> {
    let raw = TikTokVideo::deserialize_item(item)?;

    let created = DateTime::from_timestamp(raw.create_time, 0).ok_or_else(|| {
        AppError::Shape(format!(
            "Video {} has out-of-range createTime {}",
            raw.id, raw.create_time
        ))
    })?;
    let stats = raw.stats_v2.unwrap_or_default();
    let media = raw.video.unwrap_or_default();

    Ok(VideoRecord {
        tiktok_id: raw.id,
        author: author.to_string(),
        created,
        desc: raw.desc.unwrap_or_default(),
        collected: stats.collect_count,
        comments: stats.comment_count,
        plays: stats.play_count,
        shares: stats.share_count,
        cover: media.cover,
        duration: media.duration.and_then(|d| u32::try_from(d).ok()),
        dynamic_cover: media.dynamic_cover,
    })
}

impl TikTokVideo {
    fn deserialize_item(item: &Value) -> Result<Self> {
        <TikTokVideo as serde::Deserialize>::deserialize(item)
            .map_err(|e| AppError::Shape(format!("Malformed video item: {}", e)))
    }
}

/// Upserts video items for a single owner.
#[derive(Clone)]
pub struct VideoWriter {
    store: Arc<dyn ContentStore>,
}

impl VideoWriter {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Insert or update every item in `payload` as belonging to `user_id`.
    ///
    /// Returns `AppError::Shape` without writing anything if the payload has
    /// no item array. Individual item failures are logged and counted; they
    /// do not stop the remaining items.
    pub async fn upsert_videos(&self, payload: &VideoPayload, user_id: &str) -> Result<UpsertSummary> {
        let items = payload.item_list()?.items();
        let mut summary = UpsertSummary::default();

        for item in items {
            match self.upsert_one(item, user_id).await {
                Ok(UpsertOutcome::Inserted) => summary.inserted += 1,
                Ok(UpsertOutcome::Updated) => summary.updated += 1,
                Err(e) => {
                    let tiktok_id = item.get("id").unwrap_or(&Value::Null);
                    tracing::warn!(
                        user_id,
                        tiktok_id = %tiktok_id,
                        error = %e,
                        "Failed to upsert video"
                    );
                    summary.failed += 1;
                }
            }
        }
        summary.written = summary.inserted + summary.updated;

        tracing::debug!(
            user_id,
            inserted = summary.inserted,
            updated = summary.updated,
            failed = summary.failed,
            "Applied video payload"
        );
        Ok(summary)
    }

    async fn upsert_one(&self, item: &Value, user_id: &str) -> Result<UpsertOutcome> {
        let record = normalize(item, user_id)?;

        match self.store.find_video(&record.tiktok_id).await? {
            Some(existing) => {
                self.store.update_video(&existing.id, &record).await?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.store.insert_video(&record).await?;
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}
