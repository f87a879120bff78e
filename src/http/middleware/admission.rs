//! Admission middleware.
//!
//! Requests outside the API prefix pass straight through. Limited requests
//! are keyed, evaluated, and either rejected with 429 or forwarded with the
//! `X-RateLimit-*` headers attached to the handler's response.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::http::response::{apply_rate_limit_headers, rejection_response};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::client_key;

pub async fn admission_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let config = &state.rate_limit;
    if !config.enabled || !config.applies_to(request.uri().path()) {
        return next.run(request).await;
    }

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key::key_for_request(request.headers(), remote_addr, config);

    let now = Utc::now();
    let decision = state.limiter.evaluate(&key, now);
    metrics::record_admission(decision.admit);

    if !decision.admit {
        tracing::warn!(client = %key, reset_at = %decision.reset_time, "Rate limit exceeded");
        return rejection_response(config, &decision, now);
    }

    tracing::trace!(client = %key, remaining = decision.remaining, "Request admitted");
    let mut response = next.run(request).await;
    apply_rate_limit_headers(
        response.headers_mut(),
        config.max_requests,
        decision.remaining,
        decision.reset_time,
    );
    response
}
