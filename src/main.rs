// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hastok API Server
//!
//! Syncs TikTok creators' videos into Directus and serves listings,
//! aggregate stats and a manual sync trigger.

use hastok::{
    config::Config,
    db::{directus::DirectusCredentials, DirectusDb},
    services::{scheduler, TikTokClient},
    time_utils::SystemClock,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Hastok API");

    let store = Arc::new(DirectusDb::new(
        &config.directus_url,
        DirectusCredentials {
            email: config.directus_admin_email.clone(),
            password: config.directus_admin_password.clone(),
        },
    ));
    tracing::info!(url = %config.directus_url, "Directus client initialized");

    let source = Arc::new(TikTokClient::new(
        &config.tiktok_api_url,
        config.tiktok_api_key.clone(),
        config.upstream_timeout,
    )?);
    tracing::info!(
        timeout_secs = config.upstream_timeout.as_secs(),
        "TikTok API client initialized"
    );

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        source,
        Arc::new(SystemClock),
    ));

    if let Some(minutes) = config.sync_interval_minutes {
        tracing::info!(interval_minutes = minutes, "Scheduling periodic sync");
        scheduler::spawn_periodic_sync(state.sync.clone(), scheduler::sync_period(minutes));
    }

    // Build router
    let app = hastok::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hastok=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
