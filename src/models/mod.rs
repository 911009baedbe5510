// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod filters;
pub mod stats;
pub mod user;
pub mod video;
pub(crate) mod wire;

pub use filters::{DateFilter, UserSort, VideoSort};
pub use stats::{DailyStat, Metric};
pub use user::User;
pub use video::{Video, VideoRecord};

/// One page of a listing plus the total number of matching records.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}
