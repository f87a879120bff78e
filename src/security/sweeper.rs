//! Periodic eviction of stale rate-limit windows.
//!
//! Without it the record map grows with every distinct client ever seen.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::observability::metrics;
use crate::security::rate_limit::AdmissionController;

/// Spawn the sweeper. It runs until `shutdown` fires.
pub fn spawn_sweeper(
    controller: Arc<AdmissionController>,
    interval: Duration,
    grace: TimeDelta,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(interval = ?interval, grace_ms = grace.num_milliseconds(), "Rate limit sweeper starting");

        let mut ticker = time::interval(interval);
        // The first tick completes immediately; nothing can be stale yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = controller.sweep_expired(Utc::now(), grace);
                    let tracked = controller.tracked_keys();
                    metrics::record_evicted(evicted);
                    metrics::record_tracked_keys(tracked);
                    tracing::debug!(evicted, tracked, "Rate limit sweep complete");
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    })
}
