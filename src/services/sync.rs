// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync orchestration: decide which creators are due, fetch their videos,
//! upsert them and stamp the creator.
//!
//! A creator's first sync follows `next_page_id` until the provider runs out
//! of pages. Later syncs only look at the newest page, which is enough to
//! pick up new uploads and refresh counters on recent videos.

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::{DailyStat, User};
use crate::services::refresh::should_refresh;
use crate::services::tiktok::{VideoPage, VideoSource};
use crate::services::upsert::{UpsertSummary, VideoWriter};
use crate::time_utils::Clock;
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Upper bound on pages followed during a first sync.
pub const MAX_PAGES_PER_USER: usize = 500;

/// Totals for one `sync_all` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub users_scanned: usize,
    /// Users that were due and got stamped
    pub users_updated: usize,
    pub users_skipped: usize,
    pub users_failed: usize,
    pub videos_written: usize,
}

/// What happened to a single user in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOutcome {
    /// Not due yet
    Skipped,
    /// Fetched and stamped
    Refreshed { pages: usize, written: usize },
    /// First fetch or the stamp failed; the user stays due
    Failed,
}

/// Runs sync passes over every tracked user.
pub struct SyncOrchestrator {
    store: Arc<dyn ContentStore>,
    source: Arc<dyn VideoSource>,
    writer: VideoWriter,
    clock: Arc<dyn Clock>,
    concurrency: usize,
    run_lock: Mutex<()>,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn ContentStore>,
        source: Arc<dyn VideoSource>,
        clock: Arc<dyn Clock>,
        concurrency: usize,
    ) -> Self {
        Self {
            writer: VideoWriter::new(store.clone()),
            store,
            source,
            clock,
            concurrency: concurrency.max(1),
            run_lock: Mutex::new(()),
        }
    }

    /// One pass over all users.
    ///
    /// Only one pass runs at a time; a second caller gets `AppError::Conflict`
    /// instead of queueing. Per-user failures are logged and counted, so the
    /// only errors returned are the conflict and a failed user listing.
    pub async fn sync_all(&self) -> Result<SyncReport> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| AppError::Conflict("A sync run is already in progress".to_string()))?;

        let mut users = self.store.list_users().await?;
        users.sort_by(sync_order);

        tracing::info!(users = users.len(), "Starting sync run");

        let pending: Vec<_> = users.iter().map(|user| self.sync_user(user)).collect();
        let outcomes: Vec<UserOutcome> = stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = SyncReport {
            users_scanned: users.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                UserOutcome::Skipped => report.users_skipped += 1,
                UserOutcome::Refreshed { written, .. } => {
                    report.users_updated += 1;
                    report.videos_written += written;
                }
                UserOutcome::Failed => report.users_failed += 1,
            }
        }

        self.record_daily_snapshot(&users).await;

        tracing::info!(
            users_scanned = report.users_scanned,
            users_updated = report.users_updated,
            users_skipped = report.users_skipped,
            users_failed = report.users_failed,
            videos_written = report.videos_written,
            "Sync run complete"
        );
        Ok(report)
    }

    /// Sync a single user if due.
    pub async fn sync_user(&self, user: &User) -> UserOutcome {
        let now = self.clock.now();
        if !should_refresh(user, now) {
            tracing::debug!(user = %user.unique_id, "Not due for refresh");
            return UserOutcome::Skipped;
        }

        let first_sync = !user.has_synced();
        let first_page = match self.source.fetch_page(&user.unique_id, None).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(user = %user.unique_id, error = %e, "Failed to fetch videos");
                return UserOutcome::Failed;
            }
        };

        let mut summary = self.write_page(user, &first_page).await;
        let mut pages = 1;

        if first_sync {
            let mut cursor = first_page.next_cursor;
            while let Some(current) = cursor.take() {
                if pages >= MAX_PAGES_PER_USER {
                    tracing::warn!(user = %user.unique_id, pages, "Page limit reached, stopping");
                    break;
                }

                let page = match self.source.fetch_page(&user.unique_id, Some(&current)).await {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::warn!(
                            user = %user.unique_id,
                            cursor = %current,
                            error = %e,
                            "Failed to fetch page, keeping what was written"
                        );
                        break;
                    }
                };
                pages += 1;
                summary.add(self.write_page(user, &page).await);

                cursor = match page.next_cursor {
                    Some(next) if next == current => {
                        tracing::warn!(user = %user.unique_id, cursor = %current, "Cursor repeated, stopping");
                        None
                    }
                    next => next,
                };
            }
        }

        let stamp = stamp_time(user.last_media_updated, self.clock.now());
        if let Err(e) = self.store.set_last_media_updated(&user.id, stamp).await {
            tracing::error!(user = %user.unique_id, error = %e, "Failed to stamp user");
            return UserOutcome::Failed;
        }

        tracing::info!(
            user = %user.unique_id,
            first_sync,
            pages,
            inserted = summary.inserted,
            updated = summary.updated,
            failed = summary.failed,
            "Synced user"
        );
        UserOutcome::Refreshed {
            pages,
            written: summary.written,
        }
    }

    async fn write_page(&self, user: &User, page: &VideoPage) -> UpsertSummary {
        match self.writer.upsert_videos(&page.payload, &user.id).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(user = %user.unique_id, error = %e, "Skipping unusable page");
                UpsertSummary::default()
            }
        }
    }

    /// Best effort: a failed snapshot does not fail the run.
    async fn record_daily_snapshot(&self, users: &[User]) {
        let stat = DailyStat::from_users(self.clock.now().date_naive(), users);
        if let Err(e) = self.store.upsert_daily_stat(&stat).await {
            tracing::warn!(date = %stat.date, error = %e, "Failed to record daily stats");
        }
    }
}

/// Never-synced users first, then the longest-waiting, ties by id.
fn sync_order(a: &User, b: &User) -> Ordering {
    match (a.last_media_updated, b.last_media_updated) {
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (x, y) => x.cmp(&y),
    }
    .then_with(|| match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.id.cmp(&b.id),
    })
}

/// Stamps never move backwards.
fn stamp_time(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    previous.map_or(now, |prev| prev.max(now))
}
