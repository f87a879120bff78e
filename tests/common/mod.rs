//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use jobmarket_gateway::config::GatewayConfig;
use jobmarket_gateway::{admin, HttpServer, Shutdown};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const ADMIN_KEY: &str = "test-admin-key";

/// Config with a small limit and the sweeper off.
pub fn test_config(window_ms: u64, max_requests: u32) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.rate_limit.window_ms = window_ms;
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.sweep_interval_secs = 0;
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    config
}

/// Minimal stand-in for the job postings API.
pub fn jobs_api() -> Router {
    Router::new()
        .route("/api/jobs", get(|| async { Json(json!([{"id": 1, "title": "Rust Engineer"}])) }))
        .route("/api/skills", get(|| async { Json(json!([{"name": "rust", "emerging": true}])) }))
}

/// A gateway running on ephemeral ports.
pub struct Gateway {
    pub addr: SocketAddr,
    pub admin_addr: SocketAddr,
    shutdown: Shutdown,
    tasks: Vec<JoinHandle<Result<(), std::io::Error>>>,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn admin_url(&self, path: &str) -> String {
        format!("http://{}{}", self.admin_addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        for task in self.tasks {
            tokio::time::timeout(Duration::from_secs(5), task)
                .await
                .expect("server should stop after shutdown")
                .unwrap()
                .unwrap();
        }
    }
}

pub async fn spawn_gateway(config: GatewayConfig) -> Gateway {
    let server = HttpServer::new(config, jobs_api());
    let admin_router = server.admin_router();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let admin_addr = admin_listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let tasks = vec![
        tokio::spawn(server.run(listener, shutdown.subscribe())),
        tokio::spawn(admin::serve(admin_router, admin_listener, shutdown.subscribe())),
    ];

    Gateway {
        addr,
        admin_addr,
        shutdown,
        tasks,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
