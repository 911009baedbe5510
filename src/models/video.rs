//! TikTok video records (`tiktok_videos` collection).

use crate::models::wire;
use crate::time_utils::millis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized video fields, as written by the upsert path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// TikTok video ID (upsert key)
    pub tiktok_id: String,
    /// Directus id of the owning user
    #[serde(deserialize_with = "wire::id")]
    pub author: String,
    /// Creation time, stored as epoch milliseconds
    #[serde(with = "millis")]
    pub created: DateTime<Utc>,
    #[serde(default, deserialize_with = "wire::null_default")]
    pub desc: String,
    /// Saves ("collected") count
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub collected: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub comments: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub plays: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub shares: u64,
    #[serde(default)]
    pub cover: Option<String>,
    /// Length in seconds
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub dynamic_cover: Option<String>,
}

/// Stored video: the record plus its Directus primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(flatten)]
    pub record: VideoRecord,
}
