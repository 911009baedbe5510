//! Periodic sync runs inside the server process.

use crate::error::AppError;
use crate::services::sync::SyncOrchestrator;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Longest period accepted for scheduled runs.
pub const MAX_SYNC_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// `SYNC_INTERVAL_MINUTES` as a tick period, capped at `MAX_SYNC_PERIOD`.
pub fn sync_period(minutes: u64) -> Duration {
    Duration::from_secs(minutes.saturating_mul(60)).min(MAX_SYNC_PERIOD)
}

/// Run `sync_all` every `period`, starting immediately.
///
/// A tick that lands while a run is still going (from here or the trigger
/// endpoint) is skipped rather than queued.
pub fn spawn_periodic_sync(orchestrator: Arc<SyncOrchestrator>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match orchestrator.sync_all().await {
                Ok(report) => {
                    tracing::debug!(users_updated = report.users_updated, "Scheduled sync finished")
                }
                Err(AppError::Conflict(_)) => {
                    tracing::info!("Sync already running, skipping scheduled run")
                }
                Err(e) => tracing::error!(error = %e, "Scheduled sync failed"),
            }
        }
    })
}
