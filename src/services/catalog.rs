// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read side: validated, paginated listings over the content store.

use crate::db::{ContentStore, UserQuery, VideoQuery};
use crate::error::{AppError, Result};
use crate::models::{DateFilter, Page, User, UserSort, Video, VideoSort};
use crate::services::stats::{summarize, StatsSummary};
use crate::time_utils::Clock;
use std::sync::Arc;

pub const DEFAULT_USER_PAGE_SIZE: u32 = 20;
pub const DEFAULT_VIDEO_PAGE_SIZE: u32 = 24;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Video listing request, already parsed from the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoListing {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort: VideoSort,
    pub date_filter: DateFilter,
    /// Restrict to these handles; `None` or empty means everyone
    pub usernames: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn ContentStore>,
    clock: Arc<dyn Clock>,
}

impl Catalog {
    pub fn new(store: Arc<dyn ContentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn get_user(&self, unique_id: &str) -> Result<User> {
        self.store
            .find_user(unique_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", unique_id)))
    }

    pub async fn list_users(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
        sort: UserSort,
    ) -> Result<Page<User>> {
        let (page, page_size) = page_params(page, page_size, DEFAULT_USER_PAGE_SIZE)?;
        self.store
            .query_users(&UserQuery {
                page,
                page_size,
                sort,
            })
            .await
    }

    pub async fn list_videos(&self, listing: VideoListing) -> Result<Page<Video>> {
        let (page, page_size) =
            page_params(listing.page, listing.page_size, DEFAULT_VIDEO_PAGE_SIZE)?;

        let usernames = listing.usernames.filter(|names| !names.is_empty());

        self.store
            .query_videos(&VideoQuery {
                page,
                page_size,
                sort: listing.sort,
                created_between: listing.date_filter.bounds(self.clock.now()),
                usernames,
            })
            .await
    }

    pub async fn stats(&self) -> Result<StatsSummary> {
        let stats = self.store.list_daily_stats().await?;
        Ok(summarize(&stats))
    }
}

/// Validate `page` (1-based) and clamp `page_size` into `1..=MAX_PAGE_SIZE`.
fn page_params(page: Option<u32>, page_size: Option<u32>, default_size: u32) -> Result<(u32, u32)> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::BadRequest("page must be at least 1".to_string()));
    }
    let page_size = page_size.unwrap_or(default_size).clamp(1, MAX_PAGE_SIZE);
    Ok((page, page_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params() {
        assert_eq!(page_params(None, None, 24).unwrap(), (1, 24));
        assert_eq!(page_params(Some(3), Some(500), 24).unwrap(), (3, MAX_PAGE_SIZE));
        assert_eq!(page_params(Some(2), Some(0), 24).unwrap(), (2, 1));
        assert!(matches!(
            page_params(Some(0), None, 24),
            Err(AppError::BadRequest(_))
        ));
    }
}
