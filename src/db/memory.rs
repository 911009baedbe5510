// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory `ContentStore` used by the test suites and local runs without a
//! Directus instance.
//!
//! Mirrors the Directus semantics we rely on: integer ids, a unique
//! constraint on `tiktok_videos.tiktok_id`, descending sorts with id as the
//! tie-breaker, and totals computed before the page slice.

use crate::db::{page_offset, ContentStore, UserQuery, VideoQuery};
use crate::error::{AppError, Result};
use crate::models::{DailyStat, Page, User, UserSort, Video, VideoRecord, VideoSort};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    videos: DashMap<String, Video>,
    /// tiktok_id -> video id
    video_index: DashMap<String, String>,
    daily_stats: DashMap<NaiveDate, DailyStat>,
    next_video_id: AtomicU64,
    /// tiktok_ids whose writes are rejected
    failing_writes: DashSet<String>,
    /// Simulated outage: every call fails
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user (users are created outside the sync path).
    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn user(&self, id: &str) -> Option<User> {
        self.users.get(id).map(|u| u.clone())
    }

    pub fn video_by_tiktok_id(&self, tiktok_id: &str) -> Option<Video> {
        let id = self.video_index.get(tiktok_id)?.clone();
        self.videos.get(&id).map(|v| v.clone())
    }

    pub fn video_count(&self) -> usize {
        self.videos.len()
    }

    /// Make every write of this TikTok id fail with a backend error.
    pub fn fail_writes_for(&self, tiktok_id: &str) {
        self.failing_writes.insert(tiktok_id.to_string());
    }

    /// Make every store call fail with a backend error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(AppError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self, record: &VideoRecord) -> Result<()> {
        if self.failing_writes.contains(&record.tiktok_id) {
            return Err(AppError::Backend(format!(
                "write rejected for video {}",
                record.tiktok_id
            )));
        }
        if !self.users.contains_key(&record.author) {
            return Err(AppError::Backend(format!(
                "author {} does not exist",
                record.author
            )));
        }
        Ok(())
    }
}

/// Numeric ids compare numerically, anything else lexicographically.
fn cmp_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn user_sort_key(user: &User, sort: UserSort) -> i64 {
    match sort {
        UserSort::Followers => user.followers as i64,
        UserSort::Following => user.following as i64,
        UserSort::Hearts => user.hearts as i64,
        UserSort::Videos => user.videos as i64,
        UserSort::LastVideoActivity => user
            .last_video_activity
            .map(|t| t.timestamp_millis())
            .unwrap_or(i64::MIN),
    }
}

fn video_sort_key(video: &Video, sort: VideoSort) -> i64 {
    let r = &video.record;
    match sort {
        VideoSort::Created => r.created.timestamp_millis(),
        VideoSort::Plays => r.plays as i64,
        VideoSort::Collected => r.collected as i64,
        VideoSort::Comments => r.comments as i64,
        VideoSort::Shares => r.shares as i64,
    }
}

fn paginate<T>(mut items: Vec<T>, page: u32, page_size: u32) -> Page<T> {
    let total = items.len() as u64;
    let start = page_offset(page, page_size).min(items.len());
    let end = start.saturating_add(page_size as usize).min(items.len());
    let items = items.drain(start..end).collect();
    Page { items, total }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.check_available()?;
        Ok(self.users.iter().map(|u| u.clone()).collect())
    }

    async fn find_user(&self, unique_id: &str) -> Result<Option<User>> {
        self.check_available()?;
        Ok(self
            .users
            .iter()
            .find(|u| u.unique_id == unique_id)
            .map(|u| u.clone()))
    }

    async fn query_users(&self, query: &UserQuery) -> Result<Page<User>> {
        self.check_available()?;
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| {
            user_sort_key(b, query.sort)
                .cmp(&user_sort_key(a, query.sort))
                .then_with(|| cmp_ids(&a.id, &b.id))
        });
        Ok(paginate(users, query.page, query.page_size))
    }

    async fn set_last_media_updated(&self, user_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.check_available()?;
        let mut user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::Backend(format!("user {user_id} does not exist")))?;
        user.last_media_updated = Some(at);
        Ok(())
    }

    async fn find_video(&self, tiktok_id: &str) -> Result<Option<Video>> {
        self.check_available()?;
        Ok(self.video_by_tiktok_id(tiktok_id))
    }

    async fn insert_video(&self, video: &VideoRecord) -> Result<Video> {
        self.check_available()?;
        self.check_writable(video)?;

        let id = (self.next_video_id.fetch_add(1, AtomicOrdering::SeqCst) + 1).to_string();
        match self.video_index.entry(video.tiktok_id.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Backend(format!(
                    "duplicate tiktok_id {}",
                    video.tiktok_id
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(id.clone());
            }
        }

        let stored = Video {
            id: id.clone(),
            record: video.clone(),
        };
        self.videos.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_video(&self, id: &str, video: &VideoRecord) -> Result<()> {
        self.check_available()?;
        self.check_writable(video)?;

        let mut stored = self
            .videos
            .get_mut(id)
            .ok_or_else(|| AppError::Backend(format!("video {id} does not exist")))?;
        if stored.record.tiktok_id != video.tiktok_id {
            return Err(AppError::Backend(format!(
                "video {id} is {}, not {}",
                stored.record.tiktok_id, video.tiktok_id
            )));
        }
        stored.record = video.clone();
        Ok(())
    }

    async fn query_videos(&self, query: &VideoQuery) -> Result<Page<Video>> {
        self.check_available()?;
        let authors: Option<Vec<String>> = query.usernames.as_ref().map(|names| {
            self.users
                .iter()
                .filter(|u| names.contains(&u.unique_id))
                .map(|u| u.id.clone())
                .collect()
        });

        let mut videos: Vec<Video> = self
            .videos
            .iter()
            .filter(|v| {
                query
                    .created_between
                    .map_or(true, |(from, to)| v.record.created >= from && v.record.created <= to)
            })
            .filter(|v| {
                authors
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&v.record.author))
            })
            .map(|v| v.clone())
            .collect();

        videos.sort_by(|a, b| {
            video_sort_key(b, query.sort)
                .cmp(&video_sort_key(a, query.sort))
                .then_with(|| cmp_ids(&a.id, &b.id))
        });
        Ok(paginate(videos, query.page, query.page_size))
    }

    async fn list_daily_stats(&self) -> Result<Vec<DailyStat>> {
        self.check_available()?;
        let mut stats: Vec<DailyStat> = self.daily_stats.iter().map(|s| s.clone()).collect();
        stats.sort_by_key(|s| s.date);
        Ok(stats)
    }

    async fn upsert_daily_stat(&self, stat: &DailyStat) -> Result<()> {
        self.check_available()?;
        self.daily_stats.insert(stat.date, stat.clone());
        Ok(())
    }
}
