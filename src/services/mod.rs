// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod catalog;
pub mod refresh;
pub mod scheduler;
pub mod stats;
pub mod sync;
pub mod tiktok;
pub mod upsert;

pub use catalog::{Catalog, VideoListing};
pub use stats::StatsSummary;
pub use sync::{SyncOrchestrator, SyncReport};
pub use tiktok::{TikTokClient, VideoPage, VideoSource};
pub use upsert::{UpsertSummary, VideoWriter};
