//! Job market API gateway library.
//!
//! Per-process, fixed-window admission control for the job market API,
//! plus the HTTP plumbing around it.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::{AdmissionController, Decision, WindowRecord};
