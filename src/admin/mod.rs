//! Admin API over the admission controller.
//!
//! Served on its own listener, bearer-authenticated.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;
use crate::lifecycle::shutdown::signaled;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/limits/{client}", get(get_limit))
        .route("/admin/sweep", post(post_sweep))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin router until `shutdown` fires.
pub async fn serve(
    router: Router,
    listener: TcpListener,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(signaled(shutdown))
        .await
}
