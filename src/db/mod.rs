//! Storage layer (Directus collections).

pub mod directus;
pub mod memory;

pub use directus::DirectusDb;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{DailyStat, Page, User, UserSort, Video, VideoRecord, VideoSort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "tiktok_users";
    pub const VIDEOS: &str = "tiktok_videos";
    /// Daily aggregate snapshots (one row per UTC date)
    pub const DAILY_STATS: &str = "tiktok_daily_stats";
}

/// Paginated user listing, sorted descending by `sort`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserQuery {
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub sort: UserSort,
}

/// Paginated video listing, sorted descending by `sort`.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoQuery {
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub sort: VideoSort,
    /// Inclusive creation-time bounds
    pub created_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Owner handles; `None` means all users
    pub usernames: Option<Vec<String>>,
}

/// Number of records to skip for a 1-based page.
pub(crate) fn page_offset(page: u32, page_size: u32) -> usize {
    (page.max(1) as usize - 1).saturating_mul(page_size as usize)
}

/// Operations the sync path and the read API need from storage.
///
/// Single-record writes are assumed atomic; nothing spans records.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every tracked user, in no particular order.
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn find_user(&self, unique_id: &str) -> Result<Option<User>>;

    async fn query_users(&self, query: &UserQuery) -> Result<Page<User>>;

    /// Stamp the last successful sync time of a user.
    async fn set_last_media_updated(&self, user_id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Look up a stored video by its TikTok id.
    async fn find_video(&self, tiktok_id: &str) -> Result<Option<Video>>;

    async fn insert_video(&self, video: &VideoRecord) -> Result<Video>;

    /// Overwrite the mutable fields of an existing video.
    async fn update_video(&self, id: &str, video: &VideoRecord) -> Result<()>;

    async fn query_videos(&self, query: &VideoQuery) -> Result<Page<Video>>;

    /// All snapshots, oldest first.
    async fn list_daily_stats(&self) -> Result<Vec<DailyStat>>;

    /// Insert or replace the snapshot for `stat.date`.
    async fn upsert_daily_stat(&self, stat: &DailyStat) -> Result<()>;
}
