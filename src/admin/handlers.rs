use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::client_key;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub rate_limit_enabled: bool,
    pub window_ms: u64,
    pub max_requests: u32,
    pub tracked_keys: usize,
}

#[derive(Serialize)]
pub struct LimitStatus {
    pub key: String,
    pub count: u32,
    pub remaining: u32,
    pub reset_time: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SweepResult {
    pub evicted: usize,
    pub tracked_keys: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
        rate_limit_enabled: state.rate_limit.enabled,
        window_ms: state.rate_limit.window_ms,
        max_requests: state.rate_limit.max_requests,
        tracked_keys: state.limiter.tracked_keys(),
    })
}

/// Live window for a raw client address, keyed the same way requests are.
pub async fn get_limit(
    State(state): State<AppState>,
    Path(client): Path<String>,
) -> Result<Json<LimitStatus>, StatusCode> {
    let key = client_key::namespaced(&state.rate_limit.key_prefix, &client);
    let record = state
        .limiter
        .peek(&key, Utc::now())
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(LimitStatus {
        remaining: state.limiter.max_requests().saturating_sub(record.count),
        count: record.count,
        reset_time: record.reset_time,
        key,
    }))
}

/// Evict every expired window now, without grace.
pub async fn post_sweep(State(state): State<AppState>) -> Json<SweepResult> {
    let evicted = state.limiter.sweep_expired(Utc::now(), TimeDelta::zero());
    let tracked_keys = state.limiter.tracked_keys();
    metrics::record_evicted(evicted);
    metrics::record_tracked_keys(tracked_keys);
    tracing::info!(evicted, tracked_keys, "Manual rate limit sweep");

    Json(SweepResult {
        evicted,
        tracked_keys,
    })
}
