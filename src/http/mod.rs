//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, connect info)
//!     → request.rs (request ID)
//!     → middleware/admission.rs (rate limit on the API prefix)
//!     → API collaborator / routes.rs
//!     → response.rs (X-RateLimit-* headers, 429 body)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod routes;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
