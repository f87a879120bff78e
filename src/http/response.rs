//! Rate-limit response shaping.
//!
//! # Header Contract
//! - Every limited response: `X-RateLimit-Limit`, `X-RateLimit-Remaining`,
//!   `X-RateLimit-Reset` (ISO 8601, millisecond precision, UTC)
//! - Rejections additionally: `Retry-After` (seconds) and status 429 with a
//!   JSON body `{error, message, retryAfter}`

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::{RateLimitConfig, RejectionReset};
use crate::security::Decision;

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Body of a 429 response.
#[derive(Debug, Serialize)]
pub struct RateLimitExceeded {
    pub error: &'static str,
    pub message: String,
    #[serde(rename = "retryAfter")]
    pub retry_after: u64,
}

/// Format a reset instant the way it appears in headers.
pub fn format_reset(reset_time: DateTime<Utc>) -> String {
    reset_time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Attach the three `X-RateLimit-*` headers.
pub fn apply_rate_limit_headers(
    headers: &mut HeaderMap,
    limit: u32,
    remaining: u32,
    reset_time: DateTime<Utc>,
) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    if let Ok(value) = HeaderValue::from_str(&format_reset(reset_time)) {
        headers.insert(X_RATELIMIT_RESET, value);
    }
}

/// Whole seconds from `now` until `reset_time`, rounded up, at least 1.
pub fn seconds_until(reset_time: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (reset_time - now).num_milliseconds().max(0) as u64;
    millis.div_ceil(1000).max(1)
}

/// Build the 429 response for a rejected decision.
pub fn rejection_response(config: &RateLimitConfig, decision: &Decision, now: DateTime<Utc>) -> Response {
    let (reset_time, retry_after) = match config.rejection_reset {
        RejectionReset::Record => (decision.reset_time, seconds_until(decision.reset_time, now)),
        RejectionReset::Static => (
            now + chrono::TimeDelta::milliseconds(config.window_ms as i64),
            config.window_secs(),
        ),
    };

    let body = RateLimitExceeded {
        error: "Too Many Requests",
        message: format!(
            "Rate limit exceeded. Maximum {} requests per {} seconds.",
            config.max_requests,
            config.window_secs()
        ),
        retry_after,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    apply_rate_limit_headers(headers, config.max_requests, 0, reset_time);
    response
}
