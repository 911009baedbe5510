// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Hastok: TikTok content aggregation backend
//!
//! Periodically pulls creators' videos from a third-party TikTok data API
//! into Directus and serves paginated, filtered listings to the frontend.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::ContentStore;
use services::{Catalog, SyncOrchestrator, VideoSource};
use std::sync::Arc;
use time_utils::Clock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    pub sync: Arc<SyncOrchestrator>,
}

impl AppState {
    /// Wire the services together over one store, source and clock.
    pub fn new(
        config: Config,
        store: Arc<dyn ContentStore>,
        source: Arc<dyn VideoSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sync = Arc::new(SyncOrchestrator::new(
            store.clone(),
            source,
            clock.clone(),
            config.sync_concurrency,
        ));
        Self {
            catalog: Catalog::new(store, clock),
            sync,
            config,
        }
    }
}
