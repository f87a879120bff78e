//! Configuration validation.
//!
//! Serde handles the syntax; this module checks value ranges and addresses.
//! Every problem is reported, not just the first one.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, PLACEHOLDER_ADMIN_KEY};

/// Upper bound on the window length (one day).
pub const MAX_WINDOW_MS: u64 = 86_400_000;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a socket address, got {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("rate_limit.max_requests must be at least 1")]
    ZeroMaxRequests,

    #[error("rate_limit.window_ms must be between 1 and 86400000, got {0}")]
    WindowOutOfRange(u64),

    #[error("rate_limit.sweep_grace_ms must be at most 86400000, got {0}")]
    GraceOutOfRange(u64),

    #[error("rate_limit.api_prefix must start with '/', got {0:?}")]
    InvalidApiPrefix(String),

    #[error("rate_limit.key_prefix must not be empty")]
    EmptyKeyPrefix,

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingAdminKey,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);

    let rate_limit = &config.rate_limit;
    if rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroMaxRequests);
    }
    if rate_limit.window_ms == 0 || rate_limit.window_ms > MAX_WINDOW_MS {
        errors.push(ValidationError::WindowOutOfRange(rate_limit.window_ms));
    }
    if rate_limit.sweep_grace_ms > MAX_WINDOW_MS {
        errors.push(ValidationError::GraceOutOfRange(rate_limit.sweep_grace_ms));
    }
    if !rate_limit.api_prefix.starts_with('/') {
        errors.push(ValidationError::InvalidApiPrefix(rate_limit.api_prefix.clone()));
    }
    if rate_limit.key_prefix.is_empty() {
        errors.push(ValidationError::EmptyKeyPrefix);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        let key = config.admin.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_ADMIN_KEY {
            errors.push(ValidationError::MissingAdminKey);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
