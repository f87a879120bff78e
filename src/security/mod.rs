//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_key.rs (derive the quota identity)
//!     → rate_limit.rs (admit or reject against the client's window)
//!     → headers.rs (security headers on the way out)
//!
//! Background:
//!     → sweeper.rs (evict long-expired windows)
//! ```
//!
//! # Design Decisions
//! - Fixed windows, process-local state, nothing persisted
//! - Rejection is a return value, never an error
//! - Client identity is trusted as supplied

pub mod client_key;
pub mod headers;
pub mod rate_limit;
pub mod sweeper;

pub use rate_limit::{AdmissionController, Decision, WindowRecord};
