//! Built-in handlers.

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
pub struct ServiceStatus {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

fn status() -> ServiceStatus {
    ServiceStatus {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    }
}

/// Liveness probe. Sits outside the API prefix, so it is never limited.
pub async fn health() -> Json<ServiceStatus> {
    Json(status())
}

/// Stand-in API surface mounted by the gateway binary.
pub fn api_router() -> Router {
    Router::new().route("/api/status", get(|| async { Json(status()) }))
}
