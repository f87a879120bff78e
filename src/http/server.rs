//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router around the API collaborator's routes
//! - Wire up middleware (tracing, request ID, timeout, body limit,
//!   security headers, admission control)
//! - Own the process-wide admission controller
//! - Serve with connect info and graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{middleware, routing::get, Router};
use chrono::TimeDelta;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::validation::MAX_WINDOW_MS;
use crate::config::{AdminConfig, GatewayConfig, RateLimitConfig};
use crate::http::middleware::admission_middleware;
use crate::http::request::{request_id_header, MakeRequestUuid};
use crate::http::routes;
use crate::lifecycle::shutdown::signaled;
use crate::security::headers::security_headers_middleware;
use crate::security::sweeper::spawn_sweeper;
use crate::security::AdmissionController;

/// Application state injected into middleware and admin handlers.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<AdmissionController>,
    pub rate_limit: Arc<RateLimitConfig>,
    pub admin: Arc<AdminConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            limiter: Arc::new(AdmissionController::from_config(&config.rate_limit)),
            rate_limit: Arc::new(config.rate_limit.clone()),
            admin: Arc::new(config.admin.clone()),
            started_at: Instant::now(),
        }
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server that fronts `api` with admission control.
    pub fn new(config: GatewayConfig, api: Router) -> Self {
        let state = AppState::new(&config);
        let router = Self::build_router(&config, state.clone(), api);
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, api: Router) -> Router {
        let mut router = Router::new()
            .route("/health", get(routes::health))
            .merge(api)
            .layer(middleware::from_fn_with_state(state, admission_middleware));

        if config.security.enable_headers {
            router = router.layer(middleware::from_fn(security_headers_middleware));
        }

        router
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(request_id_header()))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn controller(&self) -> Arc<AdmissionController> {
        self.state.limiter.clone()
    }

    /// Admin API router sharing this server's controller.
    pub fn admin_router(&self) -> Router {
        admin::setup_admin_router(self.state.clone())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let rate_limit = &self.config.rate_limit;
        tracing::info!(
            address = %addr,
            rate_limit_enabled = rate_limit.enabled,
            window_ms = rate_limit.window_ms,
            max_requests = rate_limit.max_requests,
            api_prefix = %rate_limit.api_prefix,
            "HTTP server starting"
        );

        let sweeper = (rate_limit.enabled && rate_limit.sweep_interval_secs > 0).then(|| {
            spawn_sweeper(
                self.state.limiter.clone(),
                Duration::from_secs(rate_limit.sweep_interval_secs),
                TimeDelta::milliseconds(rate_limit.sweep_grace_ms.min(MAX_WINDOW_MS) as i64),
                shutdown.resubscribe(),
            )
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(signaled(shutdown))
            .await?;

        if let Some(handle) = sweeper {
            let _ = handle.await;
        }

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }
}
