//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_termination() resolves
//!
//! Shutdown (shutdown.rs):
//!     trigger() → gateway listener, admin listener and sweeper drain and exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
