//! TikTok creator record as stored in the `tiktok_users` collection.

use crate::models::wire;
use crate::time_utils::millis_option;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Creator profile stored in Directus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Directus primary key
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    /// TikTok handle (unique)
    pub unique_id: String,
    #[serde(default)]
    pub nickname: Option<String>,
    /// Avatar image URL
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub followers: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub following: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub hearts: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub videos: u64,
    /// When videos were last synced; `None` means never.
    #[serde(default, with = "millis_option")]
    pub last_media_updated: Option<DateTime<Utc>>,
    /// Minutes between syncs
    #[serde(default)]
    pub media_interval: Option<u32>,
    #[serde(default, with = "millis_option")]
    pub last_video_activity: Option<DateTime<Utc>>,
}

impl User {
    /// Minimum time between two syncs of this user.
    pub fn refresh_interval(&self) -> Duration {
        Duration::minutes(i64::from(self.media_interval.unwrap_or(0)))
    }

    pub fn has_synced(&self) -> bool {
        self.last_media_updated.is_some()
    }
}
